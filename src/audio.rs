//! WebAudio graph: `<audio>` element -> media source -> speakers, plus a
//! combined analyser and a channel splitter feeding left/right analysers.

use swarm_core::SpectrumSnapshot;
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

use crate::constants::*;

pub struct AudioGraph {
    pub ctx: web::AudioContext,
    combined: web::AnalyserNode,
    left: web::AnalyserNode,
    right: web::AnalyserNode,
    combined_buf: Vec<u8>,
    left_buf: Vec<u8>,
    right_buf: Vec<u8>,
}

fn create_analyser(ctx: &web::AudioContext, label: &str) -> anyhow::Result<web::AnalyserNode> {
    let analyser = ctx
        .create_analyser()
        .map_err(|e| anyhow::anyhow!("{} AnalyserNode error: {:?}", label, e))?;
    analyser.set_fft_size(FFT_SIZE);
    analyser.set_smoothing_time_constant(ANALYSER_SMOOTHING);
    analyser.set_min_decibels(ANALYSER_MIN_DB);
    analyser.set_max_decibels(ANALYSER_MAX_DB);
    Ok(analyser)
}

impl AudioGraph {
    /// Build the graph around `element`. Must run inside a user gesture for
    /// the context to be allowed to start.
    pub fn connect(element: &web::HtmlMediaElement) -> anyhow::Result<Self> {
        let ctx = web::AudioContext::new().map_err(|e| anyhow::anyhow!("AudioContext: {:?}", e))?;
        let source = ctx
            .create_media_element_source(element)
            .map_err(|e| anyhow::anyhow!("media source: {:?}", e))?;
        let splitter = ctx
            .create_channel_splitter_with_number_of_outputs(STEREO_CHANNELS)
            .map_err(|e| anyhow::anyhow!("channel splitter: {:?}", e))?;

        let combined = create_analyser(&ctx, "combined")?;
        let left = create_analyser(&ctx, "left")?;
        let right = create_analyser(&ctx, "right")?;

        let wire = |r: Result<web::AudioNode, wasm_bindgen::JsValue>, what: &str| {
            r.map(|_| ()).map_err(|e| anyhow::anyhow!("connect {}: {:?}", what, e))
        };
        wire(source.connect_with_audio_node(&combined), "source -> analyser")?;
        wire(combined.connect_with_audio_node(&ctx.destination()), "analyser -> destination")?;
        wire(source.connect_with_audio_node(&splitter), "source -> splitter")?;
        wire(splitter.connect_with_audio_node_and_output(&left, 0), "splitter -> left")?;
        wire(splitter.connect_with_audio_node_and_output(&right, 1), "splitter -> right")?;

        let bins = combined.frequency_bin_count() as usize;
        log::info!(
            "[audio] graph ready: {} bins @ {} Hz",
            bins,
            ctx.sample_rate()
        );
        Ok(Self {
            ctx,
            combined,
            left,
            right,
            combined_buf: vec![0; bins],
            left_buf: vec![0; bins],
            right_buf: vec![0; bins],
        })
    }

    /// Copy the latest analyser frames and borrow them as one snapshot.
    pub fn snapshot(&mut self) -> SpectrumSnapshot<'_> {
        self.combined.get_byte_frequency_data(&mut self.combined_buf);
        self.left.get_byte_frequency_data(&mut self.left_buf);
        self.right.get_byte_frequency_data(&mut self.right_buf);
        SpectrumSnapshot::stereo(
            &self.combined_buf,
            &self.left_buf,
            &self.right_buf,
            self.ctx.sample_rate(),
        )
    }
}

/// Resume a suspended context. Browsers create contexts suspended until a
/// gesture; this is the one asynchronous step before real data flows.
pub async fn resume(ctx: &web::AudioContext) -> anyhow::Result<()> {
    if ctx.state() == web::AudioContextState::Running {
        return Ok(());
    }
    let promise = ctx
        .resume()
        .map_err(|e| anyhow::anyhow!("resume: {:?}", e))?;
    JsFuture::from(promise)
        .await
        .map_err(|e| anyhow::anyhow!("resume rejected: {:?}", e))?;
    Ok(())
}

/// Start the media element; rejects when autoplay policy or decoding fails.
pub async fn play(element: &web::HtmlMediaElement) -> anyhow::Result<()> {
    let promise = element
        .play()
        .map_err(|e| anyhow::anyhow!("play: {:?}", e))?;
    JsFuture::from(promise)
        .await
        .map_err(|e| anyhow::anyhow!("play rejected: {:?}", e))?;
    Ok(())
}

/// Resume the context (when there is one) and start playback.
pub async fn activate(ctx: Option<&web::AudioContext>, element: &web::HtmlMediaElement) -> anyhow::Result<()> {
    if let Some(ctx) = ctx {
        resume(ctx).await?;
    }
    play(element).await
}

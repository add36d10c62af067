//! Frame decoder -> luminance reducer -> adaptive binarizer
//!
//! Every call is independent: no state survives between frames except
//! the scratch buffers of a caller-owned [`BufferPool`].

use std::time::{Duration, Instant};

use image::RgbImage;
use tracing::{debug, instrument};

use crate::config::BinarizeConfig;
use crate::error::Result;
use crate::models::{BinaryImage, RawFrame};
use crate::utils::binarization::bradley_binarize_into;
use crate::utils::grayscale::rgb_to_luma_into;
use crate::utils::memory_pool::BufferPool;
use crate::utils::yuv::decode_frame;

/// Binarize one raw frame.
///
/// `window_side` defaults to one eighth of the frame width and
/// `sensitivity` to 0.15. Parameters are checked before any pixel is read.
pub fn binarize(
    frame: &RawFrame,
    window_side: Option<usize>,
    sensitivity: Option<f64>,
) -> Result<BinaryImage> {
    let mut builder = BinarizeConfig::builder();
    if let Some(side) = window_side {
        builder = builder.window_side(side);
    }
    if let Some(sensitivity) = sensitivity {
        builder = builder.sensitivity(sensitivity);
    }
    Pipeline::new(builder.build())?.process(frame)
}

/// Duration of one pipeline stage
#[derive(Debug, Clone, Copy)]
pub struct StageTiming {
    /// Stage name: `decode`, `luma` or `threshold`
    pub name: &'static str,
    /// Wall time spent in the stage
    pub duration: Duration,
}

/// Per-stage timings of one pipeline pass
#[derive(Debug, Default, Clone)]
pub struct StageTimings {
    steps: Vec<StageTiming>,
}

impl StageTimings {
    fn add_step(&mut self, name: &'static str, duration: Duration) {
        self.steps.push(StageTiming { name, duration });
    }

    /// Sum of all stages
    pub fn total_duration(&self) -> Duration {
        self.steps.iter().map(|s| s.duration).sum()
    }

    /// Duration of a named stage
    pub fn get_step(&self, name: &str) -> Option<Duration> {
        self.steps
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.duration)
    }

    /// All stages in execution order
    pub fn steps(&self) -> &[StageTiming] {
        &self.steps
    }
}

struct Timer {
    start: Instant,
    name: &'static str,
}

impl Timer {
    fn start(name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            name,
        }
    }

    fn stop(self, timings: &mut StageTimings) {
        timings.add_step(self.name, self.start.elapsed());
    }
}

/// Configured binarization pipeline
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: BinarizeConfig,
}

impl Pipeline {
    /// Create a pipeline, rejecting out-of-range configuration up front
    pub fn new(config: BinarizeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Pipeline configured from `MAZE_WINDOW_SIDE` / `MAZE_SENSITIVITY`
    pub fn from_env() -> Result<Self> {
        Self::new(BinarizeConfig::from_env())
    }

    /// Active configuration
    pub fn config(&self) -> &BinarizeConfig {
        &self.config
    }

    /// Run all three stages on a frame
    pub fn process(&self, frame: &RawFrame) -> Result<BinaryImage> {
        let mut pool = BufferPool::new();
        let mut timings = StageTimings::default();
        self.run(frame, &mut pool, &mut timings)
            .map(|(_, binary)| binary)
    }

    /// Run all three stages, also reporting how long each took
    pub fn process_with_timings(&self, frame: &RawFrame) -> Result<(BinaryImage, StageTimings)> {
        let mut pool = BufferPool::new();
        let mut timings = StageTimings::default();
        let (_, binary) = self.run(frame, &mut pool, &mut timings)?;
        Ok((binary, timings))
    }

    /// Run all three stages and keep the decoded color image for live preview
    pub fn process_color(&self, frame: &RawFrame) -> Result<(RgbImage, BinaryImage)> {
        let mut pool = BufferPool::new();
        let mut timings = StageTimings::default();
        self.run(frame, &mut pool, &mut timings)
    }

    /// Same as [`Pipeline::process`], reusing the scratch buffers in `pool`
    pub fn process_pooled(&self, frame: &RawFrame, pool: &mut BufferPool) -> Result<BinaryImage> {
        let mut timings = StageTimings::default();
        self.run(frame, pool, &mut timings).map(|(_, binary)| binary)
    }

    #[instrument(skip_all, fields(width = frame.width(), height = frame.height()))]
    fn run(
        &self,
        frame: &RawFrame,
        pool: &mut BufferPool,
        timings: &mut StageTimings,
    ) -> Result<(RgbImage, BinaryImage)> {
        let params = self.config.resolve(frame.width())?;
        let (width, height) = (frame.width(), frame.height());

        let timer = Timer::start("decode");
        let color = decode_frame(frame)?;
        timer.stop(timings);

        let timer = Timer::start("luma");
        let (luma, integral) = pool.split_buffers(frame.luma_len());
        rgb_to_luma_into(color.as_raw(), width, height, luma)?;
        timer.stop(timings);

        let timer = Timer::start("threshold");
        let mut binary = BinaryImage::default();
        bradley_binarize_into(luma, width, height, &params, &mut binary, integral)?;
        timer.stop(timings);

        debug!(
            window_side = params.window_side(),
            sensitivity = params.sensitivity(),
            foreground = binary.count_foreground(),
            total_ms = timings.total_duration().as_secs_f64() * 1000.0,
            "frame binarized"
        );
        Ok((color, binary))
    }
}

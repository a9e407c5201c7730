use crate::animation::clock::{AnimationClock, check_reading};
use crate::assets::AssetSet;
use crate::assets::loader::AssetLoad;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::{SpindleError, SpindleResult};
use crate::render::backend::{FrameRGBA, RenderBackend};
use crate::render::cpu::CpuBackend;
use crate::scene::config::SceneConfig;
use crate::scene::frame::{FrameContext, compose_frame};
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use std::sync::mpsc;

const MAX_REORDER_BUFFER_BYTES: u64 = 128 * 1024 * 1024;

/// Options controlling `RenderSession` range rendering behavior.
#[derive(Clone, Debug)]
pub struct RenderSessionOpts {
    /// Enable frame-level parallelism (rayon), using a dedicated thread pool.
    pub parallel: bool,
    /// Frames rendered per batch before the next batch starts.
    pub chunk_size: usize,
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Bounded channel capacity between render workers and the encoder thread.
    pub channel_capacity: usize,
}

impl Default for RenderSessionOpts {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 64,
            threads: None,
            channel_capacity: 4,
        }
    }
}

/// Range render statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames rendered and delivered to the sink.
    pub frames_rendered: u64,
}

/// Offline renderer.
///
/// Loads the three assets up front (blocking, bounded by the configured timeout) and fixes the
/// animation origin at 0, so frame `i` shows elapsed time `i / fps`.
pub struct RenderSession {
    config: SceneConfig,
    assets: AssetSet,
    ctx: FrameContext,
    backend: CpuBackend,
    opts: RenderSessionOpts,
}

impl RenderSession {
    /// Validate `config` and load its assets relative to `assets_root`.
    #[tracing::instrument(skip_all, fields(root = %assets_root.display()))]
    pub fn new(
        config: SceneConfig,
        assets_root: &Path,
        opts: RenderSessionOpts,
    ) -> SpindleResult<Self> {
        config.validate()?;
        let assets =
            AssetLoad::spawn(config.resolve_assets(assets_root), config.load_timeout()).wait()?;
        Self::with_assets(config, assets, opts)
    }

    /// Build a session over already loaded assets.
    pub fn with_assets(
        config: SceneConfig,
        assets: AssetSet,
        opts: RenderSessionOpts,
    ) -> SpindleResult<Self> {
        config.validate()?;
        let mut clock = AnimationClock::new(config.timeline()?);
        clock.start(0.0)?;
        let ctx = FrameContext::new(&config, &clock, &assets)?;
        Ok(Self {
            config,
            assets,
            ctx,
            backend: CpuBackend::new(),
            opts,
        })
    }

    /// Scene configuration.
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Immutable frame context shared by every render.
    pub fn frame_context(&self) -> &FrameContext {
        &self.ctx
    }

    /// Render the frame at `elapsed_ms` since the origin.
    pub fn render_at(&mut self, elapsed_ms: f64) -> SpindleResult<FrameRGBA> {
        check_reading(elapsed_ms)?;
        let list = compose_frame(elapsed_ms, &self.ctx);
        self.backend.execute(&list, &self.assets)
    }

    /// Render frame `idx` at the configured fps.
    pub fn render_frame(&mut self, idx: FrameIndex) -> SpindleResult<FrameRGBA> {
        let ms = self.config.fps.frame_to_ms(idx);
        self.render_at(ms)
    }

    /// Frames covering one full forward-and-back cycle.
    pub fn cycle_range(&self) -> FrameRange {
        let frames = self
            .config
            .fps
            .ms_to_frames_ceil(self.ctx.timeline().cycle_ms())
            .max(1);
        FrameRange {
            start: FrameIndex(0),
            end: FrameIndex(frames),
        }
    }

    /// Render a frame range and stream frames into a sink.
    ///
    /// The sink receives frames in strictly increasing frame index order. When `parallel` is
    /// enabled, out-of-order worker completion is reordered at the sink boundary.
    #[tracing::instrument(skip_all, fields(start = range.start.0, end = range.end.0, parallel = self.opts.parallel))]
    pub fn render_range(
        &mut self,
        range: FrameRange,
        sink: &mut dyn FrameSink,
    ) -> SpindleResult<RenderStats> {
        if range.is_empty() {
            return Err(SpindleError::validation(
                "render_range range must be non-empty",
            ));
        }

        let cfg = SinkConfig {
            width: self.config.canvas.width,
            height: self.config.canvas.height,
            fps: self.config.fps,
        };

        let cap = self.opts.channel_capacity.max(1);
        let bytes_per_frame = (cfg.width as u64)
            .saturating_mul(cfg.height as u64)
            .saturating_mul(4)
            .max(1);
        let max_chunk_by_mem = (MAX_REORDER_BUFFER_BYTES / bytes_per_frame).max(1);
        let chunk_size = (self.opts.chunk_size.max(1) as u64)
            .min(max_chunk_by_mem)
            .min(range.len_frames());

        let pool = if self.opts.parallel {
            Some(build_thread_pool(self.opts.threads)?)
        } else {
            None
        };

        std::thread::scope(|scope| -> SpindleResult<RenderStats> {
            let (tx, rx) = mpsc::sync_channel::<FrameMsg>(cap);
            let range_start = range.start.0;
            let range_end = range.end.0;
            let sink_ref: &mut dyn FrameSink = sink;

            let enc = scope.spawn(move || -> SpindleResult<()> {
                sink_ref.begin(cfg)?;

                let mut next = range_start;
                let mut pending = HashMap::<u64, FrameRGBA>::new();
                while next < range_end {
                    let msg = rx.recv().map_err(|_| {
                        SpindleError::encode("encoder channel disconnected unexpectedly")
                    })?;
                    pending.insert(msg.idx.0, msg.frame);

                    while let Some(frame) = pending.remove(&next) {
                        sink_ref.push_frame(FrameIndex(next), &frame)?;
                        next += 1;
                    }
                }

                sink_ref.end()
            });

            let send = |idx: u64, frame: FrameRGBA| {
                tx.send(FrameMsg {
                    idx: FrameIndex(idx),
                    frame,
                })
                .map_err(|_| SpindleError::encode("encoder thread is not accepting frames"))
            };

            let mut stats = RenderStats::default();
            let produce_res = (|| -> SpindleResult<()> {
                let mut chunk_start = range_start;
                while chunk_start < range_end {
                    let chunk_end = (chunk_start + chunk_size).min(range_end);
                    if let Some(pool) = pool.as_ref() {
                        let frames = render_chunk_parallel(
                            pool,
                            &self.config,
                            &self.ctx,
                            &self.assets,
                            chunk_start,
                            chunk_end,
                        )?;
                        for (f, frame) in (chunk_start..chunk_end).zip(frames) {
                            send(f, frame)?;
                        }
                    } else {
                        for f in chunk_start..chunk_end {
                            let ms = self.config.fps.frame_to_ms(FrameIndex(f));
                            let list = compose_frame(ms, &self.ctx);
                            send(f, self.backend.execute(&list, &self.assets)?)?;
                        }
                    }
                    stats.frames_rendered += chunk_end - chunk_start;
                    chunk_start = chunk_end;
                }
                Ok(())
            })();

            drop(tx);
            let enc_res = enc
                .join()
                .map_err(|_| SpindleError::encode("encoder thread panicked"))?;

            match (produce_res, enc_res) {
                // A closed channel means the sink failed first; report the sink's error.
                (Err(SpindleError::Encode(_)), Err(enc_err)) => return Err(enc_err),
                (Err(e), _) | (Ok(()), Err(e)) => return Err(e),
                (Ok(()), Ok(())) => {}
            }
            tracing::debug!(frames = stats.frames_rendered, "range rendered");
            Ok(stats)
        })
    }
}

#[derive(Debug)]
struct FrameMsg {
    idx: FrameIndex,
    frame: FrameRGBA,
}

fn render_chunk_parallel(
    pool: &rayon::ThreadPool,
    config: &SceneConfig,
    ctx: &FrameContext,
    assets: &AssetSet,
    chunk_start: u64,
    chunk_end: u64,
) -> SpindleResult<Vec<FrameRGBA>> {
    pool.install(|| {
        (chunk_start..chunk_end)
            .into_par_iter()
            .map_init(CpuBackend::new, |backend, f| {
                let ms = config.fps.frame_to_ms(FrameIndex(f));
                backend.execute(&compose_frame(ms, ctx), assets)
            })
            .collect()
    })
}

fn build_thread_pool(threads: Option<usize>) -> SpindleResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(SpindleError::validation(
            "render_range 'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| SpindleError::render(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/session/render_session.rs"]
mod tests;

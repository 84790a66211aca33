//! Scene lifecycle
//!
//! A scene never calls its own hooks. The host (`SceneRunner`) calls
//! `preload` once, `create` once every requested asset has settled, and then
//! `update` every frame until the scene is destroyed.

use crate::assets::{AssetBackend, AssetCache, Loader};
use crate::consts::MAX_FRAME_DT;

/// Hooks the host invokes on a scene
pub trait SceneHooks {
    /// Declare assets and attach loader observers
    fn preload(&mut self, loader: &mut Loader);
    /// Build the scene from whatever loaded
    fn create(&mut self, assets: AssetCache);
    /// Advance one frame (seconds)
    fn update(&mut self, dt: f32);
    /// While true the host skips `update`
    fn is_paused(&self) -> bool {
        false
    }
    /// Release everything the scene owns
    fn destroy(&mut self);
}

/// Where the host is in the scene's life
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerPhase {
    /// Not booted yet
    Idle,
    /// Waiting for assets
    Preloading,
    /// `create` has run; `update` is being called
    Running,
    /// Torn down; nothing else will be called
    Destroyed,
}

/// Drives a scene's hooks in order
pub struct SceneRunner<S: SceneHooks> {
    scene: S,
    loader: Loader,
    phase: RunnerPhase,
}

impl<S: SceneHooks> SceneRunner<S> {
    pub fn new(scene: S) -> Self {
        Self {
            scene,
            loader: Loader::new(),
            phase: RunnerPhase::Idle,
        }
    }

    pub fn phase(&self) -> RunnerPhase {
        self.phase
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    /// Run `preload` and start fetching. Backends that answer synchronously
    /// get the scene created before this returns.
    pub fn boot(&mut self, backend: &mut dyn AssetBackend) {
        if self.phase != RunnerPhase::Idle {
            log::warn!("Scene already booted ({:?})", self.phase);
            return;
        }
        self.scene.preload(&mut self.loader);
        log::debug!("Preloading {} assets", self.loader.requests().len());
        self.loader.start(backend);
        self.phase = RunnerPhase::Preloading;
        self.poll_loader(0.0);
    }

    /// One host frame. Returns false once the scene is destroyed.
    pub fn frame(&mut self, dt: f32) -> bool {
        match self.phase {
            RunnerPhase::Destroyed => return false,
            RunnerPhase::Idle => return true,
            RunnerPhase::Preloading => self.poll_loader(dt),
            RunnerPhase::Running => {}
        }

        if self.phase == RunnerPhase::Running && !self.scene.is_paused() {
            self.scene.update(dt.clamp(0.0, MAX_FRAME_DT));
        }
        true
    }

    fn poll_loader(&mut self, dt: f32) {
        self.loader.pump();
        self.loader.advance(dt.clamp(0.0, MAX_FRAME_DT));
        if self.loader.is_settled() {
            let assets = self.loader.take_cache();
            self.scene.create(assets);
            self.phase = RunnerPhase::Running;
        }
    }

    /// Tear the scene down. Later frames and late load reports are ignored.
    pub fn destroy(&mut self) {
        if self.phase == RunnerPhase::Destroyed {
            return;
        }
        self.loader.close();
        self.scene.destroy();
        self.phase = RunnerPhase::Destroyed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::scripted::ScriptedAssets;

    /// Records hook calls
    #[derive(Default)]
    struct Recorder {
        calls: Vec<&'static str>,
        paused: bool,
        dt_total: f32,
        timeout_secs: Option<f32>,
        failed: Vec<String>,
    }

    impl SceneHooks for Recorder {
        fn preload(&mut self, loader: &mut Loader) {
            self.calls.push("preload");
            loader.image("ball", "assets/ball.png");
            if let Some(secs) = self.timeout_secs {
                loader.set_timeout(secs);
            }
        }

        fn create(&mut self, assets: AssetCache) {
            self.calls.push("create");
            self.failed = assets
                .failures()
                .iter()
                .map(|e| e.key().to_string())
                .collect();
        }

        fn update(&mut self, dt: f32) {
            self.calls.push("update");
            self.dt_total += dt;
        }

        fn is_paused(&self) -> bool {
            self.paused
        }

        fn destroy(&mut self) {
            self.calls.push("destroy");
        }
    }

    #[test]
    fn test_hook_order_sync_backend() {
        let mut runner = SceneRunner::new(Recorder::default());
        runner.boot(&mut ScriptedAssets::all_ok());
        assert_eq!(runner.phase(), RunnerPhase::Running);

        runner.frame(0.016);
        runner.frame(0.016);
        assert_eq!(
            runner.scene().calls,
            vec!["preload", "create", "update", "update"]
        );
    }

    #[test]
    fn test_create_waits_for_assets() {
        let mut backend = ScriptedAssets::all_ok().deferred();
        let mut runner = SceneRunner::new(Recorder::default());
        runner.boot(&mut backend);
        assert_eq!(runner.phase(), RunnerPhase::Preloading);

        runner.frame(0.016);
        assert_eq!(runner.scene().calls, vec!["preload"]);

        backend.release_all();
        runner.frame(0.016);
        assert_eq!(runner.scene().calls, vec!["preload", "create", "update"]);
    }

    #[test]
    fn test_paused_scene_not_updated() {
        let mut runner = SceneRunner::new(Recorder::default());
        runner.boot(&mut ScriptedAssets::all_ok());
        runner.scene_mut().paused = true;
        runner.frame(0.016);
        assert_eq!(runner.scene().calls, vec!["preload", "create"]);
    }

    #[test]
    fn test_frame_dt_clamped() {
        let mut runner = SceneRunner::new(Recorder::default());
        runner.boot(&mut ScriptedAssets::all_ok());
        runner.frame(5.0);
        assert!((runner.scene().dt_total - MAX_FRAME_DT).abs() < f32::EPSILON);
    }

    #[test]
    fn test_destroy_is_terminal_and_idempotent() {
        let mut runner = SceneRunner::new(Recorder::default());
        runner.boot(&mut ScriptedAssets::all_ok());
        runner.destroy();
        runner.destroy();
        assert!(!runner.frame(0.016));
        assert_eq!(runner.scene().calls, vec!["preload", "create", "destroy"]);
        assert_eq!(runner.phase(), RunnerPhase::Destroyed);
    }

    #[test]
    fn test_stalled_asset_times_out_into_create() {
        let mut scene = Recorder::default();
        scene.timeout_secs = Some(0.25);
        let mut runner = SceneRunner::new(scene);
        runner.boot(&mut ScriptedAssets::all_ok().silent("ball"));
        assert_eq!(runner.phase(), RunnerPhase::Preloading);

        runner.frame(0.1);
        runner.frame(0.1);
        assert_eq!(runner.phase(), RunnerPhase::Preloading);

        // A huge frame counts as MAX_FRAME_DT toward the timeout
        runner.frame(5.0);
        assert_eq!(runner.phase(), RunnerPhase::Running);
        assert_eq!(runner.scene().failed, vec!["ball".to_string()]);
    }

    #[test]
    fn test_destroy_before_assets_arrive() {
        let mut backend = ScriptedAssets::all_ok().deferred();
        let mut runner = SceneRunner::new(Recorder::default());
        runner.boot(&mut backend);
        runner.destroy();
        backend.release_all();
        assert!(!runner.frame(0.016));
        assert_eq!(runner.scene().calls, vec!["preload", "destroy"]);
    }
}

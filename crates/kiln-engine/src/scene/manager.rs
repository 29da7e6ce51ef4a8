use anyhow::Result;

use crate::assets::ResourceCache;
use crate::event::EventChannel;
use crate::object::IdAllocator;

use super::{Scene, SceneInitializer};

/// Builds a fresh initializer for one registered scene index.
pub type SceneFactory = Box<dyn Fn() -> Box<dyn SceneInitializer>>;

/// Owns the closed set of scenes and the one currently active.
pub struct SceneManager {
    factories: Vec<SceneFactory>,
    current: Option<Scene>,
    current_index: Option<usize>,
    events: EventChannel,
    ids: IdAllocator,
}

impl SceneManager {
    pub fn new(events: EventChannel) -> Self {
        Self {
            factories: Vec::new(),
            current: None,
            current_index: None,
            events,
            ids: IdAllocator::new(),
        }
    }

    /// Registers a scene and returns its index.
    pub fn register<F>(&mut self, factory: F) -> usize
    where
        F: Fn() -> Box<dyn SceneInitializer> + 'static,
    {
        self.factories.push(Box::new(factory));
        self.factories.len() - 1
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    #[inline]
    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    #[inline]
    pub fn scene(&self) -> Option<&Scene> {
        self.current.as_ref()
    }

    #[inline]
    pub fn scene_mut(&mut self) -> Option<&mut Scene> {
        self.current.as_mut()
    }

    /// Replaces the current scene with a freshly built scene `index`.
    ///
    /// The outgoing scene is saved and destroyed; the incoming one runs
    /// `load`, `init` and `start` before it becomes current. Initializer
    /// and save failures are logged and the switch goes ahead.
    ///
    /// # Panics
    /// If `index` was never registered.
    pub fn switch_to(&mut self, index: usize, cache: &mut ResourceCache) -> &mut Scene {
        self.replace(index, cache, true)
    }

    /// Like `switch_to`, but drops the outgoing scene without saving it.
    ///
    /// # Panics
    /// If `index` was never registered.
    pub fn switch_discarding(&mut self, index: usize, cache: &mut ResourceCache) -> &mut Scene {
        self.replace(index, cache, false)
    }

    /// Saves the current scene, if any.
    pub fn save_current(&mut self) -> Result<()> {
        match self.current.as_mut() {
            Some(scene) => scene.save_exit(),
            None => Ok(()),
        }
    }

    fn replace(&mut self, index: usize, cache: &mut ResourceCache, save_outgoing: bool) -> &mut Scene {
        assert!(
            index < self.factories.len(),
            "unknown scene index {index} ({} registered)",
            self.factories.len()
        );

        let from = self.current.as_ref().map(|s| s.name().to_owned());
        if let Some(mut old) = self.current.take() {
            if !save_outgoing {
                log::debug!("discarding scene '{}' without saving", old.name());
            } else if let Err(e) = old.save_exit() {
                log::error!("{e:#}");
            }
            old.destroy();
            self.ids = old.into_ids();
        }

        let initializer = (self.factories[index])();
        let ids = std::mem::take(&mut self.ids);
        let mut scene = Scene::new(initializer, self.events.clone(), ids);
        if let Err(e) = scene.load(cache) {
            log::error!("{e:#}");
        }
        if let Err(e) = scene.init(cache) {
            log::error!("{e:#}");
        }
        scene.start();

        match from {
            Some(from) => log::info!(
                "scene switch: '{from}' -> '{}' ({} objects)",
                scene.name(),
                scene.game_objects().len()
            ),
            None => log::info!(
                "scene start: '{}' ({} objects)",
                scene.name(),
                scene.game_objects().len()
            ),
        }

        self.current_index = Some(index);
        self.current.insert(scene)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::object::{SpriteRenderer, Transform};
    use crate::coords::Vec2;

    struct Blocks {
        name: &'static str,
        count: usize,
        saves: Rc<Cell<u32>>,
    }

    impl SceneInitializer for Blocks {
        fn name(&self) -> &str {
            self.name
        }

        fn load_resources(&mut self, _scene: &mut Scene, _cache: &mut ResourceCache) -> Result<()> {
            Ok(())
        }

        fn init(&mut self, scene: &mut Scene, _cache: &mut ResourceCache) -> Result<()> {
            for i in 0..self.count {
                let obj = scene
                    .create_game_object(format!("block {i}"))
                    .with_transform(Transform::new(Vec2::new(i as f32 * 32.0, 0.0), Vec2::splat(32.0)))
                    .with_component(SpriteRenderer::new());
                scene.add_game_object(obj);
            }
            Ok(())
        }

        fn save(&mut self, _scene: &Scene) -> Result<()> {
            self.saves.set(self.saves.get() + 1);
            Ok(())
        }
    }

    struct Unsaveable;

    impl SceneInitializer for Unsaveable {
        fn name(&self) -> &str {
            "unsaveable"
        }

        fn load_resources(&mut self, _scene: &mut Scene, _cache: &mut ResourceCache) -> Result<()> {
            Ok(())
        }

        fn init(&mut self, _scene: &mut Scene, _cache: &mut ResourceCache) -> Result<()> {
            Ok(())
        }

        fn save(&mut self, _scene: &Scene) -> Result<()> {
            anyhow::bail!("disk full")
        }
    }

    struct Broken;

    impl SceneInitializer for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn load_resources(&mut self, _scene: &mut Scene, _cache: &mut ResourceCache) -> Result<()> {
            anyhow::bail!("missing assets")
        }

        fn init(&mut self, _scene: &mut Scene, _cache: &mut ResourceCache) -> Result<()> {
            Ok(())
        }
    }

    fn manager(saves: &Rc<Cell<u32>>) -> SceneManager {
        let mut m = SceneManager::new(EventChannel::new());
        let s = saves.clone();
        m.register(move || Box::new(Blocks { name: "editor", count: 5, saves: s.clone() }));
        let s = saves.clone();
        m.register(move || Box::new(Blocks { name: "level", count: 2, saves: s.clone() }));
        m
    }

    #[test]
    fn switching_replaces_every_object_and_saves_the_old_scene() {
        let saves = Rc::new(Cell::new(0));
        let mut m = manager(&saves);
        let mut cache = ResourceCache::new();

        let old_ids: Vec<_> = m.switch_to(0, &mut cache).game_objects().iter().map(|o| o.id()).collect();
        assert_eq!(old_ids.len(), 5);
        assert_eq!(saves.get(), 0);

        let scene = m.switch_to(1, &mut cache);
        assert_eq!(scene.name(), "level");
        assert!(scene.is_running());
        assert_eq!(scene.game_objects().len(), 2);
        assert!(scene.game_objects().iter().all(|o| !old_ids.contains(&o.id())));
        assert_eq!(saves.get(), 1);
        assert_eq!(m.current_index(), Some(1));
    }

    #[test]
    fn failed_save_does_not_block_the_switch() {
        let saves = Rc::new(Cell::new(0));
        let mut m = SceneManager::new(EventChannel::new());
        m.register(|| Box::new(Unsaveable));
        let s = saves.clone();
        m.register(move || Box::new(Blocks { name: "level", count: 3, saves: s.clone() }));
        let mut cache = ResourceCache::new();

        m.switch_to(0, &mut cache);
        assert!(m.save_current().is_err());

        let scene = m.switch_to(1, &mut cache);
        assert_eq!(scene.name(), "level");
        assert!(scene.is_running());
        assert_eq!(scene.game_objects().len(), 3);
        assert_eq!(m.current_index(), Some(1));
    }

    #[test]
    fn discarding_switch_skips_the_save() {
        let saves = Rc::new(Cell::new(0));
        let mut m = manager(&saves);
        let mut cache = ResourceCache::new();

        m.switch_to(0, &mut cache);
        let scene = m.switch_discarding(0, &mut cache);
        assert!(scene.is_running());
        assert_eq!(scene.game_objects().len(), 5);
        assert_eq!(saves.get(), 0);
    }

    #[test]
    fn failing_initializer_still_starts_the_scene() {
        let mut m = SceneManager::new(EventChannel::new());
        m.register(|| Box::new(Broken));
        let scene = m.switch_to(0, &mut ResourceCache::new());
        assert!(scene.is_running());
        assert!(scene.game_objects().is_empty());
    }

    #[test]
    #[should_panic(expected = "unknown scene index")]
    fn unknown_index_panics() {
        let saves = Rc::new(Cell::new(0));
        let mut m = manager(&saves);
        m.switch_to(7, &mut ResourceCache::new());
    }

    #[test]
    fn save_current_without_scene_is_ok() {
        let m = &mut SceneManager::new(EventChannel::new());
        assert!(m.save_current().is_ok());
    }
}

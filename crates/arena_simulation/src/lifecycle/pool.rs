//! UnitPool — неактивные pooled боты, ждущие реюза

use std::collections::BTreeMap;

use bevy::prelude::*;

/// Пул по ключу prefab/stat block
///
/// Entity в пуле существуют в World с `LifecycleState::Pooled`
/// и выключенным коллайдером.
#[derive(Resource, Debug, Default)]
pub struct UnitPool {
    inactive: BTreeMap<String, Vec<Entity>>,
}

impl UnitPool {
    pub fn release(&mut self, key: &str, entity: Entity) {
        let list = self.inactive.entry(key.to_string()).or_default();
        if !list.contains(&entity) {
            list.push(entity);
        }
    }

    /// Достать самую давно вернувшуюся entity
    pub fn acquire(&mut self, key: &str) -> Option<Entity> {
        let list = self.inactive.get_mut(key)?;
        if list.is_empty() {
            return None;
        }
        Some(list.remove(0))
    }

    pub fn forget(&mut self, entity: Entity) {
        for list in self.inactive.values_mut() {
            list.retain(|&e| e != entity);
        }
    }

    pub fn len(&self, key: &str) -> usize {
        self.inactive.get(key).map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.inactive.values().all(Vec::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_acquire_order() {
        let mut pool = UnitPool::default();
        pool.release("bot", Entity::from_raw(1));
        pool.release("bot", Entity::from_raw(2));
        pool.release("bot", Entity::from_raw(1));

        assert_eq!(pool.len("bot"), 2);
        assert_eq!(pool.acquire("bot"), Some(Entity::from_raw(1)));
        assert_eq!(pool.acquire("drone"), None);
        assert_eq!(pool.acquire("bot"), Some(Entity::from_raw(2)));
        assert_eq!(pool.acquire("bot"), None);
        assert!(pool.is_empty());
    }
}

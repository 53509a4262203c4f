//! Имена каналов шины (category, event)
//!
//! Строки — контракт с движковой стороной (UI, звук, загрузчик сцен),
//! менять только синхронно с ней.

pub const HEALTH: &str = "Health";
/// Payload: `combat::HealthChanged`
pub const HEALTH_CHANGE: &str = "Change";
/// Payload: `combat::EntityDied`
pub const HEALTH_DIED: &str = "Died";

/// Event name = tag предмета ("Key", "Potion", "Gold", "Crystal").
/// Payload: `drops::ItemDropped`
pub const ITEM_DROP: &str = "ItemDrop";

pub const SCENE_MANAGEMENT: &str = "SceneManagement";

pub const ENEMIES: &str = "Enemies";
/// Враг доиграл смерть и убран со сцены. Payload: `combat::EnemyRemoved`
pub const ENEMY_DIED: &str = "Died";

pub const COMBAT: &str = "Combat";
/// Payload: `combat::ProjectileFired`
pub const PROJECTILE_FIRED: &str = "ProjectileFired";
/// Payload: `combat::StunApplied`
pub const STUN: &str = "Stun";
/// Payload: `combat::GrappleChanged`
pub const GRAPPLE: &str = "Grapple";

/// "Load" + имя сцены: `scene_load_event("Town") == "LoadTown"`
pub fn scene_load_event(scene: &str) -> String {
    format!("Load{}", scene)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_load_event_name() {
        assert_eq!(scene_load_event("Town"), "LoadTown");
        assert_eq!(scene_load_event("Crypt_01"), "LoadCrypt_01");
    }
}

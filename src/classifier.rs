use crate::config::EngineConfig;
use crate::types::{CategoryMask, Contact, ContactLabel, Proxy, ProxyId, Seconds};

/// Filters raw contacts and labels the survivors.
pub struct ContactClassifier {
    obstacle_mask: CategoryMask,
    collectible_mask: CategoryMask,
    ground_mask: CategoryMask,
    collision_mask: CategoryMask,
    self_proxy: Option<ProxyId>,
    repeat_window: Seconds,
    last_processed: Option<(ProxyId, Seconds)>,
}

impl ContactClassifier {
    pub fn new(cfg: &EngineConfig) -> Self {
        Self {
            obstacle_mask: cfg.obstacle_mask,
            collectible_mask: cfg.collectible_mask,
            ground_mask: cfg.ground_mask,
            collision_mask: cfg.collision_mask(),
            self_proxy: cfg.self_proxy,
            repeat_window: cfg.repeat_window,
            last_processed: None,
        }
    }

    /// Predicate only; see [`ContactClassifier::accept`] for the recording variant.
    pub fn should_process(&self, contact: &Contact, proxy: &Proxy, now: Seconds) -> bool {
        if proxy.is_trigger {
            return false;
        }
        if self.self_proxy == Some(contact.proxy) {
            return false;
        }
        if self.ground_mask.contains(proxy.category) {
            return false;
        }
        if !self.collision_mask.contains(proxy.category) {
            return false;
        }
        match self.last_processed {
            Some((id, at)) if id == contact.proxy && now - at < self.repeat_window => false,
            _ => true,
        }
    }

    pub fn label(&self, proxy: &Proxy) -> ContactLabel {
        if self.obstacle_mask.contains(proxy.category) {
            ContactLabel::Obstacle
        } else if self.collectible_mask.contains(proxy.category) {
            match proxy.collectible {
                Some(kind) if kind.is_power_up() => ContactLabel::PowerUp,
                _ => ContactLabel::Collectible,
            }
        } else {
            ContactLabel::Unknown
        }
    }

    /// Filter, record as the last processed contact, and label.
    pub fn accept(
        &mut self,
        contact: &Contact,
        proxy: &Proxy,
        now: Seconds,
    ) -> Option<ContactLabel> {
        if !self.should_process(contact, proxy, now) {
            return None;
        }
        self.last_processed = Some((contact.proxy, now));
        Some(self.label(proxy))
    }

    /// Timestamp of the last accepted contact.
    pub fn last_collision_time(&self) -> Option<Seconds> {
        self.last_processed.map(|(_, at)| at)
    }

    pub fn reset(&mut self) {
        self.last_processed = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, CollectibleKind, PowerUpKind};
    use glam::Vec3;

    fn contact(id: u64, category: Category, at: Seconds) -> Contact {
        Contact {
            proxy: ProxyId(id),
            point: Vec3::ZERO,
            timestamp: at,
            category,
        }
    }

    fn classifier() -> ContactClassifier {
        ContactClassifier::new(&EngineConfig::default())
    }

    #[test]
    fn test_rejects_triggers_ground_and_unmasked() {
        let c = classifier();
        let trigger = Proxy::obstacle(Vec3::ZERO, 1.0).as_trigger();
        assert!(!c.should_process(&contact(1, Category::Obstacle, 0.0), &trigger, 0.0));
        let ground = Proxy::ground(Vec3::ZERO, 1.0);
        assert!(!c.should_process(&contact(2, Category::Ground, 0.0), &ground, 0.0));
        let none = Proxy { category: Category::None, ..Proxy::obstacle(Vec3::ZERO, 1.0) };
        assert!(!c.should_process(&contact(3, Category::None, 0.0), &none, 0.0));
    }

    #[test]
    fn test_rejects_self_contact() {
        let cfg = EngineConfig { self_proxy: Some(ProxyId(7)), ..Default::default() };
        let c = ContactClassifier::new(&cfg);
        let p = Proxy::obstacle(Vec3::ZERO, 1.0);
        assert!(!c.should_process(&contact(7, Category::Obstacle, 0.0), &p, 0.0));
        assert!(c.should_process(&contact(8, Category::Obstacle, 0.0), &p, 0.0));
    }

    #[test]
    fn test_obstacle_mask_can_be_narrowed() {
        let cfg = EngineConfig { obstacle_mask: CategoryMask::EMPTY, ..Default::default() };
        let c = ContactClassifier::new(&cfg);
        let p = Proxy::obstacle(Vec3::ZERO, 1.0);
        assert!(!c.should_process(&contact(1, Category::Obstacle, 0.0), &p, 0.0));
    }

    #[test]
    fn test_last_processed_repeat_window() {
        let mut c = classifier();
        let p = Proxy::obstacle(Vec3::ZERO, 1.0);
        assert_eq!(
            c.accept(&contact(1, Category::Obstacle, 0.0), &p, 0.0),
            Some(ContactLabel::Obstacle)
        );
        assert_eq!(c.accept(&contact(1, Category::Obstacle, 0.05), &p, 0.05), None);
        // A different proxy is not affected and becomes the new "last"
        assert!(c.accept(&contact(2, Category::Obstacle, 0.06), &p, 0.06).is_some());
        assert!(c.accept(&contact(1, Category::Obstacle, 0.07), &p, 0.07).is_some());
        assert_eq!(c.last_collision_time(), Some(0.07));
        assert!(c.accept(&contact(1, Category::Obstacle, 0.2), &p, 0.2).is_some());
    }

    #[test]
    fn test_labels_collectibles_and_power_ups() {
        let c = classifier();
        let coin = Proxy::collectible(Vec3::ZERO, 0.5, CollectibleKind::Coin);
        let gem = Proxy::collectible(Vec3::ZERO, 0.5, CollectibleKind::Gem);
        let magnet =
            Proxy::collectible(Vec3::ZERO, 0.5, CollectibleKind::PowerUp(PowerUpKind::Magnet));
        assert_eq!(c.label(&coin), ContactLabel::Collectible);
        assert_eq!(c.label(&gem), ContactLabel::Collectible);
        assert_eq!(c.label(&magnet), ContactLabel::PowerUp);
        assert_eq!(c.label(&Proxy::ground(Vec3::ZERO, 1.0)), ContactLabel::Unknown);
    }

    #[test]
    fn test_reset_forgets_last_contact() {
        let mut c = classifier();
        let p = Proxy::obstacle(Vec3::ZERO, 1.0);
        c.accept(&contact(1, Category::Obstacle, 0.0), &p, 0.0);
        c.reset();
        assert_eq!(c.last_collision_time(), None);
        assert!(c.accept(&contact(1, Category::Obstacle, 0.0), &p, 0.0).is_some());
    }
}

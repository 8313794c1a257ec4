use glam::Vec2;

use reef_rush::entities::*;
use reef_rush::frenzy::FrenzyLevel;

// ── Size classes ──────────────────────────────────────────────────────────────

#[test]
fn size_classes_are_ordered() {
    assert!(SizeClass::Small < SizeClass::Medium);
    assert!(SizeClass::Medium < SizeClass::Large);
    assert_eq!(SizeClass::Small.next(), Some(SizeClass::Medium));
    assert_eq!(SizeClass::Large.next(), None);
    assert!(SizeClass::Small.base_radius() < SizeClass::Large.base_radius());
    assert!(SizeClass::Small.growth_value() < SizeClass::Large.growth_value());
}

#[test]
fn every_species_has_a_class_and_name() {
    for species in Species::ALL {
        assert!(!species.name().is_empty());
        assert!(species.base_points() > 0);
        assert!(species.base_speed() > 0.0);
        let kind = species.size_class().entity_kind();
        assert!(matches!(
            kind,
            EntityKind::SmallFish | EntityKind::MediumFish | EntityKind::LargeFish
        ));
    }
    assert_eq!(Species::Shark.size_class(), SizeClass::Large);
    assert_eq!(Species::Pufferfish.size_class(), SizeClass::Medium);
    assert_eq!(Species::PoisonFish.size_class(), SizeClass::Small);
}

// ── Body ──────────────────────────────────────────────────────────────────────

#[test]
fn body_tags_and_destroy() {
    let mut body = Body::new(3, EntityKind::Hazard, Vec2::ZERO, Vec2::ZERO, 1.0).with_tag("bomb");
    assert!(body.has_tag("bomb"));
    assert!(!body.has_tag("jellyfish"));
    assert!(body.is_alive());
    body.destroy();
    assert!(!body.is_alive());
}

// ── Play area ─────────────────────────────────────────────────────────────────

#[test]
fn play_area_contains_with_margin() {
    let area = PlayArea::new(40.0, 20.0);
    assert_eq!(area.center(), Vec2::new(20.0, 10.0));
    assert!(area.contains(Vec2::new(0.0, 0.0), 0.0, 0.0));
    assert!(!area.contains(Vec2::new(-1.0, 5.0), 0.5, 0.0));
    assert!(area.contains(Vec2::new(-1.0, 5.0), 0.5, 1.0));
}

#[test]
fn play_area_clamp_keeps_circle_inside() {
    let area = PlayArea::new(40.0, 20.0);
    assert_eq!(area.clamp(Vec2::new(-5.0, 50.0), 1.0), Vec2::new(1.0, 19.0));
    assert_eq!(area.clamp(Vec2::new(10.0, 10.0), 1.0), Vec2::new(10.0, 10.0));
    // A circle wider than the area sits in the middle.
    assert_eq!(area.clamp(Vec2::new(0.0, 0.0), 30.0), Vec2::new(20.0, 10.0));
}

// ── Stats and carry-over ──────────────────────────────────────────────────────

#[test]
fn stats_count_eats_and_frenzies() {
    let mut stats = GameStats::default();
    stats.record_eat(Species::Minnow);
    stats.record_eat(Species::Minnow);
    stats.record_eat(Species::Shark);
    stats.record_frenzy(FrenzyLevel::Frenzy);
    stats.record_frenzy(FrenzyLevel::SuperFrenzy);
    stats.record_frenzy(FrenzyLevel::None);

    assert_eq!(stats.eaten.get(&Species::Minnow), Some(&2));
    assert_eq!(stats.total_eaten(), 3);
    assert_eq!(stats.frenzies, 1);
    assert_eq!(stats.super_frenzies, 1);
}

#[test]
fn new_run_starts_at_level_one_or_higher() {
    let carry = CarryOver::new_run(0, 3, 1200);
    assert_eq!(carry.level, 1);
    assert_eq!(carry.stage, StageKind::Normal);
    assert_eq!(carry.score, 0);
    assert_eq!(carry.high_score, 1200);
    assert_eq!(carry.stats, GameStats::default());
}

#[test]
fn power_up_labels_are_distinct() {
    let mut labels: Vec<&str> = PowerUpKind::ALL.iter().map(|k| k.label()).collect();
    labels.sort_unstable();
    labels.dedup();
    assert_eq!(labels.len(), PowerUpKind::ALL.len());
}

//! Shared spell fixtures for integration tests.

use spellcard_lib::{SpellData, SpellRecord};

/// The cantrip used by the end-to-end scenarios.
#[allow(dead_code)]
pub fn acid_splash_data() -> SpellData {
    SpellData {
        title: "Acid Splash".to_string(),
        casting_time: "1 action".to_string(),
        range: "60 feet".to_string(),
        components: "V, S".to_string(),
        duration: "Instantaneous".to_string(),
        description: "You hurl a bubble of acid. Choose one creature within range, or choose \
                      two creatures within range that are within 5 feet of each other. A \
                      target must succeed on a Dexterity saving throw or take 1d6 acid damage."
            .to_string(),
        school: "Conjuration".to_string(),
        level: Some(0),
    }
}

pub fn acid_splash() -> SpellRecord {
    SpellRecord::new(acid_splash_data()).expect("fixture spell is valid")
}

#[allow(dead_code)]
pub fn fireball_data() -> SpellData {
    SpellData {
        title: "Fireball".to_string(),
        casting_time: "1 action".to_string(),
        range: "150 feet".to_string(),
        components: "V, S, M (a tiny ball of bat guano and sulfur)".to_string(),
        duration: "Instantaneous".to_string(),
        description: "A bright streak flashes from your pointing finger to a point you choose \
                      within range and then blossoms with a low roar into an explosion of flame. \
                      Each creature in a 20-foot-radius sphere centered on that point must make \
                      a Dexterity saving throw. A target takes 8d6 fire damage on a failed save, \
                      or half as much damage on a successful one."
            .to_string(),
        school: "Evocation".to_string(),
        level: Some(3),
    }
}

#[allow(dead_code)]
pub fn fireball() -> SpellRecord {
    SpellRecord::new(fireball_data()).expect("fixture spell is valid")
}

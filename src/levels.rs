/// Per-level behavioral switches, looked up once from the rule table instead
/// of branching on a raw level number throughout the engine.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct LevelRules {
    /// The exit only wins once all required items are collected.
    pub item_gate: bool,
    /// Roaming monsters take a random step after every player move.
    pub monsters_roam: bool,
    /// Cells beyond Chebyshev distance 2 of the player render obscured.
    pub fog_of_war: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct LevelConfig {
    pub width: usize,
    pub height: usize,
    /// Countdown start, in seconds.
    pub time_limit: u32,
    pub items_required: u32,
    pub monsters: usize,
    pub traps: usize,
    pub portals: usize,
    /// Percentage of all grid cells converted to fog tiles (0-100).
    pub fog_percentage: u32,
    pub rules: LevelRules,
}

pub const LEVEL_COUNT: u32 = 5;

// Level 5 hands out items without gating its exit on them; only level 2
// gates, and only level 3 has roaming monsters.
const LEVELS: [LevelConfig; LEVEL_COUNT as usize] = [
    LevelConfig {
        width: 15,
        height: 15,
        time_limit: 60,
        items_required: 0,
        monsters: 0,
        traps: 5,
        portals: 0,
        fog_percentage: 0,
        rules: LevelRules {
            item_gate: false,
            monsters_roam: false,
            fog_of_war: false,
        },
    },
    LevelConfig {
        width: 20,
        height: 20,
        time_limit: 120,
        items_required: 5,
        monsters: 0,
        traps: 10,
        portals: 2,
        fog_percentage: 0,
        rules: LevelRules {
            item_gate: true,
            monsters_roam: false,
            fog_of_war: false,
        },
    },
    LevelConfig {
        width: 25,
        height: 25,
        time_limit: 180,
        items_required: 0,
        monsters: 3,
        traps: 15,
        portals: 3,
        fog_percentage: 0,
        rules: LevelRules {
            item_gate: false,
            monsters_roam: true,
            fog_of_war: false,
        },
    },
    LevelConfig {
        width: 30,
        height: 30,
        time_limit: 300,
        items_required: 0,
        monsters: 0,
        traps: 0,
        portals: 0,
        fog_percentage: 0,
        rules: LevelRules {
            item_gate: false,
            monsters_roam: false,
            fog_of_war: false,
        },
    },
    LevelConfig {
        width: 35,
        height: 35,
        time_limit: 360,
        items_required: 10,
        monsters: 5,
        traps: 20,
        portals: 5,
        fog_percentage: 30,
        rules: LevelRules {
            item_gate: false,
            monsters_roam: false,
            fog_of_war: true,
        },
    },
];

pub fn level_config(id: u32) -> Option<&'static LevelConfig> {
    if (1..=LEVEL_COUNT).contains(&id) {
        Some(&LEVELS[(id - 1) as usize])
    } else {
        None
    }
}

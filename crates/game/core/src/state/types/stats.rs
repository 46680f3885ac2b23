//! Character stat block.

use std::ops::Add;

use super::TagSet;

/// Named stats. Used by content files to address individual fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::EnumString, strum::Display)]
#[strum(ascii_case_insensitive, serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatKind {
    Bravery,
    Faith,
    Move,
    Jump,
    Speed,
    Attack,
    Evasion,
    MaxHp,
    MaxMp,
}

/// Integer stat block shared by base stats and equipment modifiers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Stats {
    pub bravery: i32,
    pub faith: i32,
    /// Movement budget in tiles.
    pub movement: i32,
    /// Maximum climb per step, in height units.
    pub jump: i32,
    /// CT gained per scheduler tick.
    pub speed: i32,
    pub attack: i32,
    pub evasion: i32,
    pub max_hp: i32,
    pub max_mp: i32,
}

impl Stats {
    pub fn get(&self, kind: StatKind) -> i32 {
        match kind {
            StatKind::Bravery => self.bravery,
            StatKind::Faith => self.faith,
            StatKind::Move => self.movement,
            StatKind::Jump => self.jump,
            StatKind::Speed => self.speed,
            StatKind::Attack => self.attack,
            StatKind::Evasion => self.evasion,
            StatKind::MaxHp => self.max_hp,
            StatKind::MaxMp => self.max_mp,
        }
    }

    pub fn set(&mut self, kind: StatKind, value: i32) {
        let slot = match kind {
            StatKind::Bravery => &mut self.bravery,
            StatKind::Faith => &mut self.faith,
            StatKind::Move => &mut self.movement,
            StatKind::Jump => &mut self.jump,
            StatKind::Speed => &mut self.speed,
            StatKind::Attack => &mut self.attack,
            StatKind::Evasion => &mut self.evasion,
            StatKind::MaxHp => &mut self.max_hp,
            StatKind::MaxMp => &mut self.max_mp,
        };
        *slot = value;
    }
}

impl Add for Stats {
    type Output = Stats;

    fn add(self, rhs: Stats) -> Stats {
        Stats {
            bravery: self.bravery + rhs.bravery,
            faith: self.faith + rhs.faith,
            movement: self.movement + rhs.movement,
            jump: self.jump + rhs.jump,
            speed: self.speed + rhs.speed,
            attack: self.attack + rhs.attack,
            evasion: self.evasion + rhs.evasion,
            max_hp: self.max_hp + rhs.max_hp,
            max_mp: self.max_mp + rhs.max_mp,
        }
    }
}

/// A worn item contributing flat stat modifiers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Equipment {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub modifiers: Stats,
    /// Damage types dealt by basic attacks while this is worn.
    #[cfg_attr(feature = "serde", serde(default))]
    pub damage_tags: TagSet,
}

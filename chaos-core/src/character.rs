use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::patch::Substitution;
use crate::rng::SeededRandomStream;
use crate::rom::ByteStore;
use crate::Result;

pub const CHARACTER_TABLE: usize = 0x2D_7CA0;
pub const CHARACTER_RECORD_SIZE: usize = 22;
const SPECIAL_OFFSET: usize = 21;

/// Playable roster in table order. Processing always follows this order so
/// the shared random stream is consumed identically on every run.
pub const ROSTER: [&str; 14] = [
    "Terra", "Locke", "Cyan", "Shadow", "Edgar", "Sabin", "Celes", "Strago", "Relm", "Setzer",
    "Mog", "Gau", "Gogo", "Umaro",
];

pub const PROTAGONIST_ID: usize = 0;
const BERSERK_ID: usize = 13;

pub const STAT_MIN: u8 = 1;
pub const STAT_MAX: u8 = 254;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    Hp,
    Mp,
    Vigor,
    Speed,
    Stamina,
    MagicPower,
    BattlePower,
    Defense,
    MagicDefense,
    Evade,
    MagicBlock,
}

impl Stat {
    pub const ALL: [Stat; 11] = [
        Stat::Hp,
        Stat::Mp,
        Stat::Vigor,
        Stat::Speed,
        Stat::Stamina,
        Stat::MagicPower,
        Stat::BattlePower,
        Stat::Defense,
        Stat::MagicDefense,
        Stat::Evade,
        Stat::MagicBlock,
    ];

    /// Byte offset inside a character record.
    pub fn offset(self) -> usize {
        match self {
            Stat::Hp => 0,
            Stat::Mp => 1,
            Stat::Vigor => 6,
            Stat::Speed => 7,
            Stat::Stamina => 8,
            Stat::MagicPower => 9,
            Stat::BattlePower => 10,
            Stat::Defense => 11,
            Stat::MagicDefense => 12,
            Stat::Evade => 13,
            Stat::MagicBlock => 14,
        }
    }
}

/// Row = current state, column = next state, weights in percent.
pub const LEVEL_MODIFIER_TRANSITIONS: [[u8; 4]; 4] = [
    [70, 20, 5, 5],
    [18, 70, 10, 2],
    [9, 20, 70, 1],
    [20, 9, 1, 70],
];

pub const RUN_CHANCE_TRANSITIONS: [[u8; 4]; 4] = [
    [95, 5, 0, 0],
    [20, 70, 10, 0],
    [0, 10, 80, 10],
    [0, 0, 20, 80],
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CharacterStatRecord {
    pub id: usize,
    pub name: &'static str,
    pub stats_original: BTreeMap<Stat, u8>,
    pub stats_mutated: BTreeMap<Stat, u8>,
    pub level_modifier: u8,
    pub run_chance: u8,
    pub berserk: bool,
    #[serde(skip)]
    raw: [u8; CHARACTER_RECORD_SIZE],
}

impl CharacterStatRecord {
    pub fn from_bytes(id: usize, raw: [u8; CHARACTER_RECORD_SIZE]) -> Self {
        let stats: BTreeMap<Stat, u8> = Stat::ALL.iter().map(|&s| (s, raw[s.offset()])).collect();
        let special = raw[SPECIAL_OFFSET];

        Self {
            id,
            name: ROSTER.get(id).copied().unwrap_or("?"),
            stats_original: stats.clone(),
            stats_mutated: stats,
            level_modifier: (special >> 2) & 0x03,
            run_chance: special & 0x03,
            berserk: id == BERSERK_ID,
            raw,
        }
    }

    pub fn address(&self) -> usize {
        CHARACTER_TABLE + self.id * CHARACTER_RECORD_SIZE
    }

    /// The record as it should be written back: mutated stats and the packed
    /// level/run byte over the original bytes.
    pub fn to_bytes(&self) -> [u8; CHARACTER_RECORD_SIZE] {
        let mut out = self.raw;
        for (&stat, &value) in &self.stats_mutated {
            out[stat.offset()] = value;
        }
        out[SPECIAL_OFFSET] =
            (out[SPECIAL_OFFSET] & 0xF0) | ((self.level_modifier & 0x03) << 2) | (self.run_chance & 0x03);
        out
    }

    pub fn to_substitution(&self) -> Substitution {
        Substitution::new(self.address(), self.to_bytes().to_vec())
    }
}

/// Parse the playable roster from the character table.
pub fn read_characters(store: &ByteStore) -> Result<Vec<CharacterStatRecord>> {
    ROSTER
        .iter()
        .enumerate()
        .map(|(id, _)| {
            let bytes = store.read_n(CHARACTER_TABLE + id * CHARACTER_RECORD_SIZE, CHARACTER_RECORD_SIZE)?;
            let mut raw = [0u8; CHARACTER_RECORD_SIZE];
            raw.copy_from_slice(bytes);
            Ok(CharacterStatRecord::from_bytes(id, raw))
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
pub struct StatMutator {
    pub randomize_level: bool,
}

impl Default for StatMutator {
    fn default() -> Self {
        Self {
            randomize_level: true,
        }
    }
}

impl StatMutator {
    pub fn new(randomize_level: bool) -> Self {
        Self { randomize_level }
    }

    /// Mutate one record in place: every stat, then run chance, then (unless
    /// disabled or the protagonist) the level modifier.
    pub fn mutate(&self, record: &mut CharacterStatRecord, rng: &mut SeededRandomStream) {
        for stat in Stat::ALL {
            let current = record.stats_mutated.get(&stat).copied().unwrap_or(0);
            let original = record.stats_original.get(&stat).copied().unwrap_or(current);
            let mutated = mutate_stat(current, original, record.berserk, rng);
            record.stats_mutated.insert(stat, mutated);
        }

        record.run_chance = transition(record.run_chance, &RUN_CHANCE_TRANSITIONS, rng);

        if self.randomize_level && record.id != PROTAGONIST_ID {
            record.level_modifier = transition(record.level_modifier, &LEVEL_MODIFIER_TRANSITIONS, rng);
        }

        debug!(
            "mutated {} (level {}, run {})",
            record.name, record.level_modifier, record.run_chance
        );
    }

    pub fn mutate_all(&self, records: &mut [CharacterStatRecord], rng: &mut SeededRandomStream) {
        for record in records.iter_mut() {
            self.mutate(record, rng);
        }
    }
}

/// One normal draw and one digit draw per pass. A berserk character whose
/// result lands below its original value starts over from the base rather
/// than multiplying the low value further: a value that keeps shrinking
/// could need unboundedly many draws to climb back, while a restart always
/// has the same fixed chance of landing at or above the floor.
fn mutate_stat(current: u8, original: u8, berserk: bool, rng: &mut SeededRandomStream) -> u8 {
    let floor = original.min(STAT_MAX);
    let start = f64::from(current) + if berserk { 1.0 } else { 0.0 };

    loop {
        let mut value = start;
        loop {
            let multiplier = rng.normal(1.0, 0.17).clamp(0.5, 1.5);
            value *= multiplier;
            if rng.int_range(0, 9) != 0 {
                break;
            }
        }

        let result = value.round().clamp(f64::from(STAT_MIN), f64::from(STAT_MAX)) as u8;
        if !berserk || result >= floor {
            return result;
        }
    }
}

/// Inverse-CDF step through one row of a percentage matrix.
fn transition(current: u8, matrix: &[[u8; 4]; 4], rng: &mut SeededRandomStream) -> u8 {
    let row = &matrix[usize::from(current.min(3))];
    let mut remaining = rng.int_range(0, 99);
    let mut index = 0usize;
    while remaining >= 0 && index < row.len() {
        remaining -= i64::from(row[index]);
        index += 1;
    }
    (index - 1) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: usize, value: u8, berserk: bool) -> CharacterStatRecord {
        let mut raw = [0u8; CHARACTER_RECORD_SIZE];
        for stat in Stat::ALL {
            raw[stat.offset()] = value;
        }
        let mut rec = CharacterStatRecord::from_bytes(id, raw);
        rec.berserk = berserk;
        rec
    }

    #[test]
    fn matrices_are_row_stochastic() {
        for matrix in [&LEVEL_MODIFIER_TRANSITIONS, &RUN_CHANCE_TRANSITIONS] {
            for row in matrix.iter() {
                assert_eq!(row.iter().map(|&w| u32::from(w)).sum::<u32>(), 100);
            }
        }
    }

    #[test]
    fn parses_special_byte() {
        let mut raw = [0u8; CHARACTER_RECORD_SIZE];
        raw[0] = 40;
        raw[SPECIAL_OFFSET] = 0b1010_1110;
        let rec = CharacterStatRecord::from_bytes(3, raw);
        assert_eq!(rec.name, "Shadow");
        assert_eq!(rec.stats_original[&Stat::Hp], 40);
        assert_eq!(rec.level_modifier, 3);
        assert_eq!(rec.run_chance, 2);
        assert!(!rec.berserk);
        assert_eq!(rec.to_bytes(), raw);
    }

    #[test]
    fn umaro_is_berserk() {
        let rec = CharacterStatRecord::from_bytes(13, [0u8; CHARACTER_RECORD_SIZE]);
        assert!(rec.berserk);
    }

    #[test]
    fn serializes_mutated_values_and_keeps_other_bytes() {
        let mut raw = [0x11u8; CHARACTER_RECORD_SIZE];
        raw[SPECIAL_OFFSET] = 0xA0;
        let mut rec = CharacterStatRecord::from_bytes(1, raw);
        rec.stats_mutated.insert(Stat::Speed, 99);
        rec.level_modifier = 2;
        rec.run_chance = 1;

        let bytes = rec.to_bytes();
        assert_eq!(bytes[Stat::Speed.offset()], 99);
        assert_eq!(bytes[2], 0x11);
        assert_eq!(bytes[SPECIAL_OFFSET], 0xA0 | (2 << 2) | 1);
        assert_eq!(rec.to_substitution().address, CHARACTER_TABLE + CHARACTER_RECORD_SIZE);
    }

    #[test]
    fn reads_roster_from_store() {
        let mut data = vec![0u8; CHARACTER_TABLE + ROSTER.len() * CHARACTER_RECORD_SIZE];
        data[CHARACTER_TABLE + 2 * CHARACTER_RECORD_SIZE + Stat::Vigor.offset()] = 48;
        let records = read_characters(&ByteStore::new(data)).unwrap();
        assert_eq!(records.len(), 14);
        assert_eq!(records[2].stats_original[&Stat::Vigor], 48);
    }

    #[test]
    fn reading_short_store_fails() {
        assert!(read_characters(&ByteStore::new(vec![0u8; 16])).is_err());
    }

    #[test]
    fn mutated_stats_stay_in_range() {
        let mutator = StatMutator::default();
        for seed in 0..40u64 {
            let mut rng = SeededRandomStream::new(seed);
            for value in [0u8, 1, 2, 17, 100, 200, 253, 254, 255] {
                for berserk in [false, true] {
                    let mut rec = record(1, value, berserk);
                    mutator.mutate(&mut rec, &mut rng);
                    for (&stat, &v) in &rec.stats_mutated {
                        assert!((STAT_MIN..=STAT_MAX).contains(&v), "{stat:?}={v}");
                    }
                    assert!(rec.level_modifier <= 3);
                    assert!(rec.run_chance <= 3);
                    assert_eq!(rec.stats_original[&Stat::Hp], value);
                }
            }
        }
    }

    #[test]
    fn same_seed_same_result() {
        let mutator = StatMutator::default();
        let mut a = record(4, 60, false);
        let mut b = record(4, 60, false);
        mutator.mutate(&mut a, &mut SeededRandomStream::new(77));
        mutator.mutate(&mut b, &mut SeededRandomStream::new(77));
        assert_eq!(a, b);
    }

    #[test]
    fn berserk_bias_is_upward() {
        let mut rng = SeededRandomStream::new(2024);
        let trials = 10_000;
        let original = 60u8;

        let mut berserk_sum = 0u64;
        let mut control_sum = 0u64;
        let mut berserk_below = 0u32;
        let mut control_below = 0u32;
        for _ in 0..trials {
            let v = mutate_stat(original, original, true, &mut rng);
            berserk_sum += u64::from(v);
            berserk_below += u32::from(v < original);

            let c = mutate_stat(original, original, false, &mut rng);
            control_sum += u64::from(c);
            control_below += u32::from(c < original);
        }

        assert!(berserk_sum as f64 / trials as f64 >= f64::from(original));
        assert!(berserk_sum >= control_sum);
        assert!(berserk_below <= control_below);
    }

    #[test]
    fn protagonist_level_is_fixed() {
        let mutator = StatMutator::default();
        for seed in 0..200u64 {
            let mut rec = record(PROTAGONIST_ID, 30, false);
            rec.level_modifier = 1;
            mutator.mutate(&mut rec, &mut SeededRandomStream::new(seed));
            assert_eq!(rec.level_modifier, 1);
        }
    }

    #[test]
    fn disabled_level_randomisation_still_moves_run_chance() {
        let mutator = StatMutator::new(false);
        let mut level_changed = false;
        let mut run_changed = false;
        for seed in 0..200u64 {
            let mut rec = record(5, 30, false);
            rec.level_modifier = 2;
            rec.run_chance = 1;
            mutator.mutate(&mut rec, &mut SeededRandomStream::new(seed));
            level_changed |= rec.level_modifier != 2;
            run_changed |= rec.run_chance != 1;
        }
        assert!(!level_changed);
        assert!(run_changed);
    }

    #[test]
    fn transition_never_picks_zero_weight() {
        let mut rng = SeededRandomStream::new(5);
        for _ in 0..2000 {
            let next = transition(0, &RUN_CHANCE_TRANSITIONS, &mut rng);
            assert!(next <= 1, "state 0 can only move to 0 or 1, got {next}");
            let next = transition(3, &RUN_CHANCE_TRANSITIONS, &mut rng);
            assert!(next >= 2, "state 3 can only move to 2 or 3, got {next}");
        }
    }
}

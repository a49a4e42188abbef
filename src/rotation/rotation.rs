//! Level rotation - an ordered, optionally shuffled playlist of levels.

use bevy::log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::catalog::LevelCatalog;

use super::entry::LevelRotationEntry;
use super::game_rules::GameRulesResolver;

/// Identifier of an auxiliary rotation. `0` means "not assigned".
pub type ExtInfoId = u32;

/// How a rotation is randomised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RandomisationFlags {
    /// Shuffle the entry order (and each entry's mode deck) on initialise.
    pub shuffle: bool,
    /// Keep entries (2i, 2i+1) adjacent when shuffling.
    pub maintain_pairs: bool,
}

impl RandomisationFlags {
    pub const NONE: Self = Self {
        shuffle: false,
        maintain_pairs: false,
    };
    pub const SHUFFLE: Self = Self {
        shuffle: true,
        maintain_pairs: false,
    };
    pub const SHUFFLE_PAIRS: Self = Self {
        shuffle: true,
        maintain_pairs: true,
    };
}

/// What the "change level" console action should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeLevelAction {
    /// A game context is running: switch it to the new level in place.
    ChangeContext {
        level: String,
        game_rules: Option<String>,
    },
    /// No context yet: run these console commands.
    ConsoleCommands(Vec<String>),
}

/// A playlist of (level, game mode deck) entries with a cursor.
///
/// The cursor (`next`) ranges over `0..=len`. Values below `len` select an
/// entry; `len` means the current lap is exhausted.
#[derive(Debug, Clone)]
pub struct LevelRotation {
    entries: Vec<LevelRotationEntry>,
    shuffle: Vec<usize>,
    flags: RandomisationFlags,
    next: usize,
    advances_taken: u32,
    has_game_mode_decks: bool,
    ext_info_id: ExtInfoId,
    rng: StdRng,
}

impl Default for LevelRotation {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelRotation {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create a rotation whose shuffles are driven by a seeded generator.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            entries: Vec::new(),
            shuffle: Vec::new(),
            flags: RandomisationFlags::NONE,
            next: 0,
            advances_taken: 0,
            has_game_mode_decks: false,
            ext_info_id: 0,
            rng,
        }
    }

    /// Drop all entries and flags. The generator state is kept.
    pub fn reset(&mut self) {
        self.flags = RandomisationFlags::NONE;
        self.next = 0;
        self.entries.clear();
        self.shuffle.clear();
        self.ext_info_id = 0;
        self.has_game_mode_decks = false;
    }

    /// Append a level with no game modes; returns its index.
    pub fn add_level(&mut self, level: &str) -> usize {
        let index = self.entries.len();
        self.entries.push(LevelRotationEntry::new(level));
        self.shuffle.push(index);
        index
    }

    pub fn add_level_with_mode(
        &mut self,
        level: &str,
        game_mode: &str,
        rules: &dyn GameRulesResolver,
    ) -> usize {
        let index = self.add_level(level);
        self.add_game_mode(index, game_mode, rules);
        index
    }

    /// Add a game mode to entry `index`. Names the resolver does not know are dropped.
    pub fn add_game_mode(&mut self, index: usize, game_mode: &str, rules: &dyn GameRulesResolver) {
        let Some(entry) = self.entries.get_mut(index) else {
            debug!("add_game_mode: entry {} out of range", index);
            return;
        };

        let Some(name) = rules.canonical_name(game_mode) else {
            debug!("add_game_mode: unknown game rules '{}' dropped", game_mode);
            return;
        };

        if entry.push_game_mode(name) {
            self.has_game_mode_decks = true;
        }
    }

    /// Move the cursor to the first entry. Returns false if the rotation is empty.
    pub fn first(&mut self) -> bool {
        debug!("Rotation first");
        self.next = 0;
        !self.entries.is_empty()
    }

    /// Step to the next entry.
    ///
    /// Every call also steps the current entry's mode cursor, so a deck
    /// plays one of its modes per visit. Returns false once the cursor
    /// reaches the end of the lap.
    pub fn advance(&mut self) -> bool {
        self.advances_taken += 1;

        if self.next < self.entries.len() {
            let real = self.resolve(self.next);
            let entry = &mut self.entries[real];
            entry.advance_mode();
            if entry.mode_count() > 1 {
                debug!(
                    " advanced level entry {} current_mode_index to {}",
                    self.next, entry.current_mode_index
                );
            }
        }

        self.next += 1;
        debug!(
            "Rotation advance: advances_taken = {}, next = {}",
            self.advances_taken, self.next
        );

        self.next < self.entries.len()
    }

    /// Advance and start a new lap when exhausted. Returns true if it looped.
    ///
    /// A new lap reshuffles the entry order only; mode decks keep their order.
    pub fn advance_and_loop_if_needed(&mut self) -> bool {
        if self.advance() {
            return false;
        }

        debug!("Rotation looping");
        self.first();
        if self.flags.shuffle {
            self.shallow_shuffle();
        }
        true
    }

    /// Reset counters and shuffle according to the flags.
    ///
    /// A non-negative `seed` reseeds this rotation's generator first.
    pub fn initialise(&mut self, seed: i64) {
        debug!("Rotation initialise (seed {})", seed);
        self.advances_taken = 0;
        self.first();

        if seed >= 0 {
            self.rng = StdRng::seed_from_u64(seed as u64);
        }

        if !self.entries.is_empty() && self.flags.shuffle {
            self.shallow_shuffle();
            self.mode_shuffle();
        }
    }

    fn draw(&mut self, bound: usize) -> usize {
        (self.rng.gen::<u32>() as usize) % bound
    }

    /// Shuffle the entry order.
    ///
    /// With `maintain_pairs` only even slots are drawn and each swap moves a
    /// slot together with its odd successor.
    pub fn shallow_shuffle(&mut self) {
        let count = self.entries.len();
        self.shuffle = (0..count).collect();
        if count == 0 {
            return;
        }

        if self.flags.maintain_pairs && count >= 2 {
            let half = count / 2;
            for i in (0..count).step_by(2) {
                let index = self.draw(half) * 2;
                self.shuffle.swap(i, index);
                if i + 1 < count && index + 1 < count {
                    self.shuffle.swap(i + 1, index + 1);
                }
            }
        } else {
            for i in 0..count {
                let index = self.draw(count);
                self.shuffle.swap(i, index);
            }
        }

        for (slot, index) in self.shuffle.iter().enumerate() {
            debug!(" {} - {} ({})", slot, index, self.entries[*index].level_name);
        }
    }

    /// Shuffle every entry's mode deck and rewind its mode cursor.
    pub fn mode_shuffle(&mut self) {
        if !self.has_game_mode_decks {
            return;
        }

        for level in 0..self.entries.len() {
            let modes = self.entries[level].mode_count();
            let mut order: Vec<usize> = (0..modes).collect();
            for i in 0..modes {
                let index = self.draw(modes);
                order.swap(i, index);
            }

            let entry = &mut self.entries[level];
            entry.game_rules_shuffle = order;
            entry.current_mode_index = 0;
        }
    }

    fn resolve(&self, index: usize) -> usize {
        if self.flags.shuffle {
            self.shuffle[index]
        } else {
            index
        }
    }

    /// Map a rotation index to an index into `entries`.
    fn real_index(&self, index: usize, access_shuffled: bool) -> Option<usize> {
        if index >= self.entries.len() {
            return None;
        }
        if access_shuffled && self.flags.shuffle {
            self.shuffle.get(index).copied()
        } else {
            Some(index)
        }
    }

    fn current_entry(&self) -> Option<&LevelRotationEntry> {
        if self.next < self.entries.len() {
            Some(&self.entries[self.resolve(self.next)])
        } else {
            None
        }
    }

    /// Level under the cursor, or `None` when exhausted.
    pub fn next_level(&self) -> Option<&str> {
        self.current_entry().map(|entry| entry.level_name.as_str())
    }

    /// Game mode of the entry under the cursor.
    pub fn next_game_rules(&self) -> Option<&str> {
        self.current_entry().and_then(LevelRotationEntry::game_mode_name)
    }

    pub fn level(&self, index: usize, access_shuffled: bool) -> Option<&str> {
        self.real_index(index, access_shuffled)
            .map(|real| self.entries[real].level_name.as_str())
    }

    pub fn game_rules_count_for_entry(&self, index: usize, access_shuffled: bool) -> usize {
        self.real_index(index, access_shuffled)
            .map(|real| self.entries[real].mode_count())
            .unwrap_or(0)
    }

    /// Mode `mode` of entry `index`, following the mode shuffle when `access_shuffled`.
    pub fn game_rules(&self, index: usize, mode: usize, access_shuffled: bool) -> Option<&str> {
        let entry = &self.entries[self.real_index(index, access_shuffled)?];
        if mode >= entry.mode_count() {
            return None;
        }
        let mode = if access_shuffled && self.flags.shuffle {
            entry.game_rules_shuffle[mode]
        } else {
            mode
        };
        entry.game_rules_names.get(mode).map(String::as_str)
    }

    /// Currently selected mode of entry `index` (shuffled access).
    pub fn next_game_rules_for_entry(&self, index: usize) -> Option<&str> {
        let real = self.real_index(index, true)?;
        self.entries[real].game_mode_name()
    }

    /// Whether the entry under the cursor and the one after it (wrapping)
    /// name the same level and mode. Always true when exhausted.
    pub fn next_pair_match(&self) -> bool {
        if self.next >= self.entries.len() {
            return true;
        }

        let current = &self.entries[self.resolve(self.next)];
        let mut following = self.next + 1;
        if following >= self.entries.len() {
            following = 0;
        }
        let following = &self.entries[self.resolve(following)];

        if !current.level_name.eq_ignore_ascii_case(&following.level_name) {
            return false;
        }
        match (current.game_mode_name(), following.game_mode_name()) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            (None, None) => true,
            _ => false,
        }
    }

    pub fn advances_taken(&self) -> u32 {
        self.advances_taken
    }

    /// Rewind the cursor, the advance counter and every mode cursor.
    pub fn reset_advancement(&mut self) {
        debug!("Rotation reset advancement");
        self.advances_taken = 0;
        self.next = 0;
        for entry in &mut self.entries {
            entry.current_mode_index = 0;
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_game_mode_entries(&self) -> usize {
        self.entries.iter().map(LevelRotationEntry::mode_count).sum()
    }

    pub fn next_index(&self) -> usize {
        self.next
    }

    pub fn entries(&self) -> &[LevelRotationEntry] {
        &self.entries
    }

    /// Permutation of entry indices used when shuffled.
    pub fn shuffle_order(&self) -> &[usize] {
        &self.shuffle
    }

    pub fn flags(&self) -> RandomisationFlags {
        self.flags
    }

    pub fn set_randomisation_flags(&mut self, flags: RandomisationFlags) {
        self.flags = flags;
    }

    pub fn is_random(&self) -> bool {
        self.flags.shuffle
    }

    pub fn has_game_mode_decks(&self) -> bool {
        self.has_game_mode_decks
    }

    pub fn ext_info_id(&self) -> ExtInfoId {
        self.ext_info_id
    }

    pub fn set_ext_info_id(&mut self, id: ExtInfoId) {
        self.ext_info_id = id;
    }

    /// Resolve the "change level" console action for the entry under the
    /// cursor, then advance (wrapping to the first entry when exhausted).
    ///
    /// The game rules fall back to `current_game_rules` and then to the
    /// level's default game type.
    pub fn change_level(
        &mut self,
        args: &[String],
        context_started: bool,
        current_game_rules: Option<&str>,
        catalog: &LevelCatalog,
    ) -> Option<ChangeLevelAction> {
        let action = self.next_level().map(|level| {
            let game_rules = self
                .next_game_rules()
                .filter(|rules| !rules.is_empty())
                .map(str::to_string)
                .or_else(|| current_game_rules.map(str::to_string))
                .or_else(|| {
                    catalog
                        .lookup(level)
                        .and_then(|info| info.default_game_type())
                        .map(|game_type| game_type.name.clone())
                });

            if context_started {
                ChangeLevelAction::ChangeContext {
                    level: level.to_string(),
                    game_rules,
                }
            } else {
                let mut commands = Vec::new();
                if let Some(rules) = &game_rules {
                    commands.push(format!("sv_gamerules {}", rules));
                }
                let mut map = format!("map {}", level);
                for arg in args {
                    map.push(' ');
                    map.push_str(arg);
                }
                map.push_str(" s");
                commands.push(map);
                ChangeLevelAction::ConsoleCommands(commands)
            }
        });

        if !self.advance() {
            self.first();
        }

        action
    }
}

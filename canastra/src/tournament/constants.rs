/// Score that wins a match outright.
pub const WIN_THRESHOLD: i32 = 4000;

/// Lives a team starts with.
pub const STARTING_LIVES: u32 = 2;

/// Lives granted to a team when it reregisters.
pub const REREGISTRATION_LIVES: u32 = 1;

/// Reregistration is refused once the current round number reaches this value.
pub const REREGISTRATION_CUTOFF_ROUND: u32 = 5;

/// Name given to a tournament created from scratch.
pub const DEFAULT_TOURNAMENT_NAME: &str = "Torneio de Canastra 2025";

/// Key the snapshot is stored under.
pub const DEFAULT_STORAGE_KEY: &str = "canastra-tournament";

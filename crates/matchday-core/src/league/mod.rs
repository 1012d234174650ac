// League data model and the mutation rules that keep it consistent.

pub mod fixture;
pub mod state;
pub mod team;

pub use fixture::{Match, MatchId, MatchStatus};
pub use state::LeagueState;
pub use team::{Team, TeamId};

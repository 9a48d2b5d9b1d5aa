use crate::board::Symbol;
use serde::Serialize;

/// Cumulative vs-AI outcomes for a room. Survives game resets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WinStats {
    pub human_wins: u32,
    pub ai_wins: u32,
    pub draws: u32,
    pub consecutive_human_wins: u32,
}

/// Every fifth consecutive human win earns a banner that the socket
/// layer forwards inside the game_over payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub streak: u32,
    pub banner: String,
}

impl WinStats {
    pub fn record(&mut self, winner: Option<Symbol>, human: Symbol) -> Option<Milestone> {
        match winner {
            Some(symbol) if symbol == human => {
                self.human_wins += 1;
                self.consecutive_human_wins += 1;
                let streak = self.consecutive_human_wins;
                (streak % 5 == 0).then(|| Milestone {
                    streak,
                    banner: format!("{} wins in a row! The machines are worried.", streak),
                })
            }
            Some(_) => {
                self.ai_wins += 1;
                self.consecutive_human_wins = 0;
                None
            }
            None => {
                self.draws += 1;
                self.consecutive_human_wins = 0;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_track_each_outcome() {
        let mut stats = WinStats::default();
        stats.record(Some(Symbol::X), Symbol::X);
        stats.record(Some(Symbol::O), Symbol::X);
        stats.record(None, Symbol::X);
        assert_eq!(stats.human_wins, 1);
        assert_eq!(stats.ai_wins, 1);
        assert_eq!(stats.draws, 1);
        assert_eq!(stats.consecutive_human_wins, 0);
    }

    #[test]
    fn milestone_fires_at_five_and_every_fifth_after() {
        let mut stats = WinStats::default();
        for n in 1..=10 {
            let milestone = stats.record(Some(Symbol::O), Symbol::O);
            match n {
                5 | 10 => {
                    let milestone = milestone.expect("milestone");
                    assert_eq!(milestone.streak, n);
                    assert!(milestone.banner.contains(&n.to_string()));
                }
                _ => assert!(milestone.is_none()),
            }
        }
    }

    #[test]
    fn ai_wins_and_draws_reset_the_streak() {
        let mut stats = WinStats::default();
        for _ in 0..4 {
            stats.record(Some(Symbol::X), Symbol::X);
        }
        stats.record(Some(Symbol::O), Symbol::X);
        assert_eq!(stats.consecutive_human_wins, 0);
        for _ in 0..4 {
            stats.record(Some(Symbol::X), Symbol::X);
        }
        stats.record(None, Symbol::X);
        assert_eq!(stats.consecutive_human_wins, 0);
        assert_eq!(stats.human_wins, 8);
    }
}

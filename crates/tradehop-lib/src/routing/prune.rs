//! Beam pruning between hops.

use tracing::debug;

use crate::route::{rank_routes, Route};

/// Score pruning only starts once a generation holds more routes than this.
pub const SCORE_CUT_MIN_ROUTES: usize = 10;

/// Drop routes scoring below `percent` of the best, from hop `from_hop` on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreCut {
    pub percent: f64,
    /// 1-based hop number at which the cut first applies.
    pub from_hop: usize,
}

/// Both pruning policies; either may be disabled.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BeamPolicy {
    /// Keep at most this many routes from the second hop on.
    pub max_routes: Option<usize>,
    pub score_cut: Option<ScoreCut>,
}

impl BeamPolicy {
    /// Prune `routes` before computing hop `hop_no` (0-based).
    ///
    /// Leaves `routes` rank-sorted and returns how many were dropped. The best
    /// route is never removed.
    pub fn apply(&self, routes: &mut Vec<Route>, hop_no: usize) -> usize {
        let before = routes.len();
        rank_routes(routes);

        if let Some(max_routes) = self.max_routes {
            if hop_no >= 1 {
                routes.truncate(max_routes.max(1));
            }
        }

        if let Some(cut) = self.score_cut {
            if hop_no + 1 >= cut.from_hop && routes.len() > SCORE_CUT_MIN_ROUTES {
                let threshold = routes[0].score() * cut.percent / 100.0;
                while routes.len() > 1 && routes[routes.len() - 1].score() < threshold {
                    routes.pop();
                }
            }
        }

        let pruned = before - routes.len();
        if pruned > 0 {
            debug!(hop = hop_no + 1, pruned, kept = routes.len(), "pruned routes");
        }
        pruned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::Hop;

    fn routes_with_scores(scores: &[f64]) -> Vec<Route> {
        scores
            .iter()
            .enumerate()
            .map(|(index, score)| {
                Route::seed(1, 100).extend(index as i64 + 2, Hop::new(Vec::new()), vec![1], *score)
            })
            .collect()
    }

    #[test]
    fn top_n_cut_waits_for_second_hop() {
        let policy = BeamPolicy {
            max_routes: Some(2),
            score_cut: None,
        };
        let mut routes = routes_with_scores(&[1.0, 5.0, 3.0]);
        assert_eq!(policy.apply(&mut routes, 0), 0);
        assert_eq!(routes.len(), 3);
        assert_eq!(routes[0].score(), 5.0);

        assert_eq!(policy.apply(&mut routes, 1), 1);
        let scores: Vec<f64> = routes.iter().map(Route::score).collect();
        assert_eq!(scores, vec![5.0, 3.0]);
    }

    #[test]
    fn score_cut_needs_more_than_ten_routes() {
        let policy = BeamPolicy {
            max_routes: None,
            score_cut: Some(ScoreCut {
                percent: 50.0,
                from_hop: 2,
            }),
        };
        let mut few = routes_with_scores(&[100.0, 1.0, 2.0]);
        assert_eq!(policy.apply(&mut few, 5), 0);

        let mut many = routes_with_scores(&[
            100.0, 90.0, 80.0, 70.0, 60.0, 50.0, 40.0, 30.0, 20.0, 10.0, 5.0,
        ]);
        assert_eq!(policy.apply(&mut many, 0), 0, "hop 1 is before from_hop");
        assert_eq!(policy.apply(&mut many, 1), 5);
        assert!(many.iter().all(|r| r.score() >= 50.0));
        assert_eq!(many[0].score(), 100.0);
    }

    #[test]
    fn pruning_never_grows_or_drops_the_best() {
        let policy = BeamPolicy {
            max_routes: Some(1),
            score_cut: Some(ScoreCut {
                percent: 100.0,
                from_hop: 2,
            }),
        };
        let scores: Vec<f64> = (0..25).map(|n| f64::from(n) * 3.0).collect();
        let mut routes = routes_with_scores(&scores);
        let best = routes
            .iter()
            .map(Route::score)
            .fold(f64::MIN, f64::max);
        for hop in 0..4 {
            let before = routes.len();
            policy.apply(&mut routes, hop);
            assert!(routes.len() <= before);
            assert_eq!(routes[0].score(), best);
        }
    }

    #[test]
    fn negative_best_score_keeps_best() {
        let policy = BeamPolicy {
            max_routes: None,
            score_cut: Some(ScoreCut {
                percent: 90.0,
                from_hop: 2,
            }),
        };
        let scores: Vec<f64> = (0..12).map(|n| -f64::from(n)).collect();
        let mut routes = routes_with_scores(&scores);
        policy.apply(&mut routes, 3);
        assert_eq!(routes[0].score(), 0.0);
    }
}

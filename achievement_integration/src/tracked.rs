use {
    bevy::prelude::*,
    gameplay_events::{
        BubbleManager, GameOutcome, GameOverController, GameplayEvent, PoppedBubble, ScoreManager,
    },
    std::marker::PhantomData,
    system_schedule::GameSchedule,
};

/// Wraps a gameplay collaborator and records what it did.
///
/// Every call is forwarded unchanged and its return value handed back as-is;
/// the resulting [`GameplayEvent`]s queue up until [`Tracked::drain`]. As a
/// resource, [`TrackedPlugin`] drains it into the gameplay message stream.
#[derive(Resource, Debug, Default)]
pub struct Tracked<M> {
    inner: M,
    outbox: Vec<GameplayEvent>,
}

impl<M> Tracked<M> {
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            outbox: Vec::new(),
        }
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut M {
        &mut self.inner
    }

    pub fn into_inner(self) -> M {
        self.inner
    }

    pub fn pending(&self) -> &[GameplayEvent] {
        &self.outbox
    }

    pub fn drain(&mut self) -> Vec<GameplayEvent> {
        std::mem::take(&mut self.outbox)
    }
}

/// Forwards what a [`Tracked<M>`] resource recorded into [`GameplayEvent`]
/// messages at the start of every frame.
pub struct TrackedPlugin<M>(PhantomData<fn() -> M>);

impl<M> Default for TrackedPlugin<M> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<M: Send + Sync + 'static> Plugin for TrackedPlugin<M> {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            forward_tracked::<M>
                .in_set(GameSchedule::FrameStart)
                .run_if(resource_exists::<Tracked<M>>),
        );
    }
}

pub fn forward_tracked<M: Send + Sync + 'static>(
    mut tracked: ResMut<Tracked<M>>,
    mut gameplay: MessageWriter<GameplayEvent>,
) {
    if tracked.pending().is_empty() {
        return;
    }
    let events = tracked.drain();
    trace!(count = events.len(), "forwarding tracked gameplay events");
    gameplay.write_batch(events);
}

impl<M: BubbleManager> BubbleManager for Tracked<M> {
    fn pop_bubble(&mut self, bubble: &PoppedBubble) -> u64 {
        let score = self.inner.pop_bubble(bubble);
        self.outbox.push(GameplayEvent::BubblePopped {
            bubble: bubble.clone(),
            score,
        });
        score
    }
}

impl<M: ScoreManager> ScoreManager for Tracked<M> {
    fn add_score(&mut self, points: u64) -> u64 {
        let total = self.inner.add_score(points);
        self.outbox.push(GameplayEvent::ScoreAdded { points, total });
        total
    }
}

impl<M: GameOverController> GameOverController for Tracked<M> {
    fn game_over(&mut self, outcome: &GameOutcome) -> bool {
        let accepted = self.inner.game_over(outcome);
        if accepted {
            self.outbox.push(GameplayEvent::GameOver(outcome.clone()));
        }
        accepted
    }
}

#[cfg(test)]
mod tests {
    use {super::*, std::time::Duration};

    #[derive(Default)]
    struct Board {
        total: u64,
        over: bool,
    }

    impl BubbleManager for Board {
        fn pop_bubble(&mut self, bubble: &PoppedBubble) -> u64 {
            if bubble.bubble_type == "poison" { 0 } else { 15 }
        }
    }

    impl ScoreManager for Board {
        fn add_score(&mut self, points: u64) -> u64 {
            self.total += points;
            self.total
        }
    }

    impl GameOverController for Board {
        fn game_over(&mut self, _outcome: &GameOutcome) -> bool {
            !std::mem::replace(&mut self.over, true)
        }
    }

    fn bubble(bubble_type: &str) -> PoppedBubble {
        PoppedBubble {
            bubble_type: bubble_type.into(),
            age_ratio: 0.3,
            combo: 1,
        }
    }

    #[test]
    fn return_values_pass_through() {
        let mut tracked = Tracked::new(Board::default());
        assert_eq!(tracked.pop_bubble(&bubble("normal")), 15);
        assert_eq!(tracked.pop_bubble(&bubble("poison")), 0);
        assert_eq!(tracked.add_score(15), 15);
        assert_eq!(tracked.add_score(5), 20);
        assert_eq!(tracked.inner().total, 20);

        let events = tracked.drain();
        assert_eq!(events.len(), 4);
        assert_eq!(
            events[3],
            GameplayEvent::ScoreAdded {
                points: 5,
                total: 20
            }
        );
        assert!(tracked.pending().is_empty());
    }

    #[test]
    fn rejected_game_over_is_not_reported() {
        let mut tracked = Tracked::new(Board::default());
        let outcome = GameOutcome {
            victory: true,
            final_score: 100,
            hp: 3,
            max_hp: 5,
            duration: Duration::from_secs(40),
        };
        assert!(tracked.game_over(&outcome));
        assert!(!tracked.game_over(&outcome));
        assert_eq!(tracked.drain(), vec![GameplayEvent::GameOver(outcome)]);
    }
}

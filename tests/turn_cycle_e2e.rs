//! End-to-end tests for the turn cycle: phases, mana, drawing and the
//! legality gate

use mindspark_duel::{
    core::{
        ArithmeticContentService, Card, CardDefinition, CardId, DeckEngine, DrawOutcome, Element, ProblemCategory,
        ProblemHints, Side,
    },
    game::{
        ActionKind, ActionType, AttackTarget, CombatPhase, CombatState, ExtendedGameState, GameAction, GameEvent,
        Phase, PhaseSequencer, TurnOrchestrator,
    },
    loader::sample_deck,
    DuelConfig, DuelError, ValidationError,
};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use similar_asserts::assert_eq;

fn new_match(orchestrator: &TurnOrchestrator<'_>, seed: u64) -> ExtendedGameState {
    orchestrator
        .new_match(&sample_deck(Element::Fire), &sample_deck(Element::Water), seed)
        .unwrap()
        .state
}

fn act(side: Side, action: ActionKind) -> GameAction {
    GameAction::new(side, action)
}

fn definition(key: &str, cost: u8) -> CardDefinition {
    CardDefinition {
        key: key.to_string(),
        name: key.to_string(),
        cost,
        power: 3,
        defense: 3,
        element: Element::Earth,
        problem_category: ProblemCategory::Science,
        problem_hints: ProblemHints::default(),
        ability: None,
    }
}

#[test]
fn test_new_match_deals_hands_and_starts_player_turn() {
    let config = DuelConfig::default();
    let content = ArithmeticContentService;
    let orchestrator = TurnOrchestrator::new(&config, &content);
    let state = new_match(&orchestrator, 42);

    assert_eq!(state.turn_number, 1);
    assert_eq!(state.active_player, Side::Player);
    assert_eq!(state.current_phase, Phase::PreCombatMain);
    assert_eq!(state.player.hand.len(), 6);
    assert_eq!(state.player.deck.len(), 14);
    assert_eq!(state.opponent.hand.len(), 5);
    assert_eq!(state.opponent.deck.len(), 15);
    assert_eq!((state.player.mana.current, state.player.mana.max), (1, 1));
    assert_eq!(state.opponent.mana.max, 0);
    assert_eq!(state.player.health, 20);
    assert!(state.winner.is_none());
    state.check_invariants(&config).unwrap();
}

#[test]
fn test_phase_cycle_returns_home_after_twelve_steps() {
    for start in Phase::ALL {
        let mut phase = start;
        for _ in 0..12 {
            phase = PhaseSequencer::next_phase(phase);
        }
        assert_eq!(phase, start);
    }
}

#[test]
fn test_mana_grows_to_cap() {
    let config = DuelConfig::default();
    let content = ArithmeticContentService;
    let orchestrator = TurnOrchestrator::new(&config, &content);

    let mut state = ExtendedGameState::new(3, config.starting_health);
    state.install_deck(Side::Player, &sample_deck(Element::Earth));
    state.install_deck(Side::Opponent, &sample_deck(Element::Air));
    assert_eq!(state.player.mana.max, 0);

    let mut maxima = Vec::new();
    for _ in 0..11 {
        state = orchestrator.start_turn(&state).state;
        maxima.push(state.player.mana.max);
        assert_eq!(state.player.mana.current, state.player.mana.max);
    }
    assert_eq!(maxima, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 10]);
}

#[test]
fn test_walk_through_a_turn_with_end_phase() {
    let config = DuelConfig::default();
    let content = ArithmeticContentService;
    let orchestrator = TurnOrchestrator::new(&config, &content);
    let state = new_match(&orchestrator, 42);

    let state = orchestrator
        .execute_action(&state, &act(Side::Player, ActionKind::EndPhase))
        .unwrap()
        .state;
    assert_eq!(state.current_phase, Phase::BeginCombat);
    assert!(matches!(state.combat, CombatPhase::Active(_)));

    let state = orchestrator
        .execute_action(&state, &act(Side::Player, ActionKind::EndPhase))
        .unwrap()
        .state;
    assert_eq!(state.current_phase, Phase::DeclareAttackers);

    // Nobody attacks: straight to the second main phase
    let outcome = orchestrator
        .execute_action(&state, &act(Side::Player, ActionKind::ConfirmAttackers))
        .unwrap();
    assert_eq!(outcome.state.current_phase, Phase::PostCombatMain);
    assert_eq!(outcome.state.combat, CombatPhase::NoCombat);
    assert!(outcome.events.contains(&GameEvent::PhaseChanged {
        from: Phase::EndCombat,
        to: Phase::PostCombatMain,
    }));

    let state = orchestrator
        .execute_action(&outcome.state, &act(Side::Player, ActionKind::EndPhase))
        .unwrap()
        .state;
    assert_eq!(state.current_phase, Phase::EndStep);

    let outcome = orchestrator
        .execute_action(&state, &act(Side::Player, ActionKind::EndPhase))
        .unwrap();
    let state = outcome.state;
    assert_eq!(state.active_player, Side::Opponent);
    assert_eq!(state.turn_number, 2);
    assert_eq!(state.current_phase, Phase::PreCombatMain);
    assert_eq!(state.opponent.mana.max, 1);
    assert_eq!(state.opponent.hand.len(), 6);
    assert!(state.action_log.is_empty());
    assert!(outcome.events.contains(&GameEvent::TurnEnded { side: Side::Player }));
    assert!(outcome.events.contains(&GameEvent::TurnStarted {
        turn_number: 2,
        side: Side::Opponent,
    }));
    state.check_invariants(&config).unwrap();
}

#[test]
fn test_pass_turn_alternates_sides() {
    let config = DuelConfig::default();
    let content = ArithmeticContentService;
    let orchestrator = TurnOrchestrator::new(&config, &content);
    let mut state = new_match(&orchestrator, 5);

    for turn in 1..=8u32 {
        assert_eq!(state.turn_number, turn);
        let side = state.active_player;
        state = orchestrator
            .execute_action(&state, &act(side, ActionKind::PassTurn))
            .unwrap()
            .state;
        assert_eq!(state.active_player, side.other());
        assert_eq!(state.current_phase, Phase::PreCombatMain);
        state.check_invariants(&config).unwrap();
    }
    assert_eq!(state.player.mana.max, 5);
    assert_eq!(state.opponent.mana.max, 4);
}

#[test]
fn test_fatigue_damage_grows() {
    let config = DuelConfig::default();
    let content = ArithmeticContentService;
    let orchestrator = TurnOrchestrator::new(&config, &content);
    let mut state = new_match(&orchestrator, 9);

    while let DrawOutcome::Drawn(card) = DeckEngine::draw_card(&mut state.player.deck) {
        state.player.hand.push(card);
    }
    assert!(state.player.deck.is_empty());
    let hand = state.player.hand.len();

    let first = orchestrator.start_turn(&state);
    assert!(first.events.contains(&GameEvent::FatigueDamage {
        side: Side::Player,
        damage: 1,
    }));
    assert_eq!(first.state.player.health, 19);

    let second = orchestrator.start_turn(&first.state);
    assert!(second.events.contains(&GameEvent::FatigueDamage {
        side: Side::Player,
        damage: 2,
    }));
    assert_eq!(second.state.player.health, 17);
    assert_eq!(second.state.player.hand.len(), hand);
    assert!(second.state.player.deck.is_empty());
    assert_eq!(second.state.player.fatigue_counter(), 2);
}

/// One representative action of each type
fn representative(action_type: ActionType) -> ActionKind {
    let id = CardId::new(1);
    match action_type {
        ActionType::PlayCard => ActionKind::PlayCard { card_id: id },
        ActionType::Attack => ActionKind::Attack {
            attacker_id: id,
            target: AttackTarget::Face,
            is_correct: true,
        },
        ActionType::DeclareAttacker => ActionKind::DeclareAttacker {
            card_id: id,
            target: AttackTarget::Face,
        },
        ActionType::DeclareBlocker => ActionKind::DeclareBlocker {
            attacker_id: id,
            blocker_id: CardId::new(2),
        },
        ActionType::ConfirmAttackers => ActionKind::ConfirmAttackers,
        ActionType::SkipBlockers => ActionKind::SkipBlockers,
        ActionType::SubmitCombatAnswer => ActionKind::SubmitCombatAnswer {
            card_id: id,
            is_attacker: true,
            is_correct: true,
            response_time_ms: 100,
        },
        ActionType::UseAbility => ActionKind::UseAbility {
            card_id: id,
            target_id: None,
        },
        ActionType::EndPhase => ActionKind::EndPhase,
        ActionType::PassTurn => ActionKind::PassTurn,
    }
}

#[test]
fn test_disallowed_actions_leave_state_identical() {
    let config = DuelConfig::default();
    let content = ArithmeticContentService;
    let orchestrator = TurnOrchestrator::new(&config, &content);
    let base = new_match(&orchestrator, 42);

    let mut checked = 0;
    for phase in Phase::ALL {
        let mut state = base.clone();
        state.current_phase = phase;
        if phase.is_combat() {
            state.combat = CombatPhase::Active(CombatState::new());
        }
        let before = serde_json::to_string(&state).unwrap();

        for action_type in ActionType::ALL {
            if PhaseSequencer::is_allowed(phase, action_type) {
                continue;
            }
            for side in [Side::Player, Side::Opponent] {
                let result = orchestrator.execute_action(&state, &act(side, representative(action_type)));
                assert!(result.is_err(), "{action_type} by {side} was accepted during {phase}");
                checked += 1;
            }
            assert_eq!(serde_json::to_string(&state).unwrap(), before);
        }
    }
    assert!(checked > 0);
}

#[test]
fn test_wrong_phase_is_reported() {
    let config = DuelConfig::default();
    let content = ArithmeticContentService;
    let orchestrator = TurnOrchestrator::new(&config, &content);
    let state = new_match(&orchestrator, 42);

    let err = orchestrator
        .execute_action(&state, &act(Side::Player, ActionKind::SkipBlockers))
        .unwrap_err();
    assert_eq!(
        err.as_validation(),
        Some(&ValidationError::ActionNotAllowed {
            action: ActionType::SkipBlockers,
            phase: Phase::PreCombatMain,
        })
    );

    let err = orchestrator
        .execute_action(&state, &act(Side::Opponent, ActionKind::EndPhase))
        .unwrap_err();
    assert!(matches!(
        err,
        DuelError::Validation(ValidationError::NotYourDecision {
            expected: Side::Player,
            actual: Side::Opponent,
        })
    ));
}

#[test]
fn test_play_card_spends_mana_and_enters_board() {
    let config = DuelConfig::default();
    let content = ArithmeticContentService;
    let orchestrator = TurnOrchestrator::new(&config, &content);
    let mut state = new_match(&orchestrator, 42);

    let cheap = Card::from_definition(CardId::new(500), &definition("pebble", 1));
    state.player.hand.push(cheap);

    let outcome = orchestrator
        .execute_action(
            &state,
            &act(Side::Player, ActionKind::PlayCard { card_id: CardId::new(500) }),
        )
        .unwrap();
    let after = &outcome.state;
    assert_eq!(after.player.mana.current, 0);
    assert!(after.player.hand_card(CardId::new(500)).is_none());
    let played = after.player.board_card(CardId::new(500)).unwrap();
    assert!(!played.can_attack);
    assert!(outcome.events.contains(&GameEvent::CardPlayed {
        side: Side::Player,
        card_id: CardId::new(500),
        cost: 1,
    }));

    // Summoning sickness wears off on the side's next turn
    let mut state = after.clone();
    for _ in 0..2 {
        let side = state.active_player;
        state = orchestrator
            .execute_action(&state, &act(side, ActionKind::PassTurn))
            .unwrap()
            .state;
    }
    assert!(state.player.board_card(CardId::new(500)).unwrap().ready_to_attack());
}

#[test]
fn test_board_limit_rejects_play() {
    let config = DuelConfig::default().with_board_limit(1);
    let content = ArithmeticContentService;
    let orchestrator = TurnOrchestrator::new(&config, &content);
    let mut state = new_match(&orchestrator, 42);

    state
        .player
        .board
        .push(Card::from_definition(CardId::new(600), &definition("wall", 1)));
    state
        .player
        .hand
        .push(Card::from_definition(CardId::new(601), &definition("pebble", 1)));

    let err = orchestrator
        .execute_action(
            &state,
            &act(Side::Player, ActionKind::PlayCard { card_id: CardId::new(601) }),
        )
        .unwrap_err();
    assert_eq!(err.as_validation(), Some(&ValidationError::BoardFull { limit: 1 }));
}

#[test]
fn test_twenty_five_card_deck_scenario() {
    let config = DuelConfig::default();
    let content = ArithmeticContentService;
    let orchestrator = TurnOrchestrator::new(&config, &content);

    let definitions: Vec<CardDefinition> = (0..25)
        .map(|i| definition(&format!("card-{i}"), (i % 10) as u8 + 1))
        .collect();
    let cards = DeckEngine::instantiate(&definitions, 1);
    let mut rng = ChaCha12Rng::seed_from_u64(77);
    let mut deck = DeckEngine::initialize_deck(cards, &mut rng);

    let mut hand = Vec::new();
    for _ in 0..5 {
        match DeckEngine::draw_card(&mut deck) {
            DrawOutcome::Drawn(card) => hand.push(card),
            DrawOutcome::Fatigue { .. } => panic!("deck ran out early"),
        }
    }
    assert_eq!(hand.len(), 5);
    assert_eq!(deck.len(), 20);
    assert_eq!(deck.drawn_cards.len(), 5);

    let mut state = ExtendedGameState::new(77, config.starting_health);
    state.player.deck = deck;
    state.player.hand = hand;
    state.turn_number = 1;
    state.current_phase = Phase::PreCombatMain;
    state.player.mana.max = 1;
    state.player.mana.current = 1;

    // Make sure there is an unaffordable card in hand
    let pricey = Card::from_definition(CardId::new(100), &definition("boulder", 6));
    state.player.hand.push(pricey);
    let before = state.clone();

    let err = orchestrator
        .execute_action(
            &state,
            &act(Side::Player, ActionKind::PlayCard { card_id: CardId::new(100) }),
        )
        .unwrap_err();
    assert_eq!(
        err.as_validation(),
        Some(&ValidationError::InsufficientMana {
            required: 6,
            available: 1,
        })
    );
    assert_eq!(state, before);
    assert_eq!(state.player.hand.len(), 6);
    assert!(state.player.board.is_empty());
}

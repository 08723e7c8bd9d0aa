//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::*;
use super::transition::*;
use super::*;
use crate::catalog::{MenuCatalog, MenuId, ToolId, ToolKind, BACK_TO_MAIN};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context(policy: DiceRollPolicy) -> ConvContext {
    ConvContext::new("test-conv", policy)
}

fn catalog() -> MenuCatalog {
    MenuCatalog::standard()
}

fn callback_ids() -> Vec<String> {
    let catalog = catalog();
    let mut ids: Vec<String> = [MenuId::Root, MenuId::Dice]
        .into_iter()
        .flat_map(|menu| catalog.tools_for_menu(menu))
        .map(|tool| tool.id.as_str().to_string())
        .collect();
    ids.push(BACK_TO_MAIN.to_string());
    ids
}

fn input_tool_ids() -> Vec<ToolId> {
    catalog()
        .tools_for_menu(MenuId::Root)
        .into_iter()
        .filter(|tool| matches!(tool.kind, ToolKind::NeedsInput { .. }))
        .map(|tool| tool.id)
        .collect()
}

fn instant_root_ids() -> Vec<String> {
    catalog()
        .tools_for_menu(MenuId::Root)
        .into_iter()
        .filter(|tool| matches!(tool.kind, ToolKind::Instant(_)))
        .map(|tool| tool.id.as_str().to_string())
        .collect()
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_policy() -> impl Strategy<Value = DiceRollPolicy> {
    prop_oneof![
        Just(DiceRollPolicy::StayInSubmenu),
        Just(DiceRollPolicy::ReturnToMainMenu),
    ]
}

fn arb_awaiting_state() -> impl Strategy<Value = ConvState> {
    prop::sample::select(input_tool_ids())
        .prop_map(|pending_tool| ConvState::AwaitingInput { pending_tool })
}

fn arb_state() -> impl Strategy<Value = ConvState> {
    prop_oneof![
        Just(ConvState::IdleMenu),
        arb_awaiting_state(),
        Just(ConvState::DiceSubmenu),
    ]
}

fn arb_conversation() -> impl Strategy<Value = Conversation> {
    (arb_state(), 0u32..4).prop_map(|(state, attempts)| {
        let mut scratch = Scratch::default();
        if state.pending_tool().is_some() {
            for _ in 0..attempts {
                scratch.record_invalid_attempt();
            }
        }
        Conversation { state, scratch }
    })
}

fn arb_command() -> impl Strategy<Value = Command> {
    prop_oneof![
        Just(Command::Start),
        Just(Command::Cancel),
        Just(Command::Help),
    ]
}

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[ -~\n]{0,60}",
        (-50i64..50, -50i64..50).prop_map(|(a, b)| format!("{a} {b}")),
        (0i64..200).prop_map(|n| n.to_string()),
        proptest::collection::vec("[a-z]{1,6}", 0..6).prop_map(|lines| lines.join("\n")),
        (proptest::collection::vec("[a-z]{1,6}", 0..6), -2i64..8)
            .prop_map(|(names, n)| format!("{}\n\n{n}", names.join("\n"))),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        prop::sample::select(callback_ids()).prop_map(Event::select),
        "[a-z_0-9]{1,12}".prop_map(Event::select),
        arb_text().prop_map(Event::text),
        arb_command().prop_map(Event::command),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Invariant 1: Any event sequence keeps the conversation consistent
    #[test]
    fn prop_random_walk_preserves_invariants(
        events in proptest::collection::vec(arb_event(), 0..30),
        policy in arb_policy(),
        seed in any::<u64>(),
    ) {
        let ctx = test_context(policy);
        let catalog = catalog();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut conv = Conversation::new();

        for event in events {
            let before = conv.clone();
            match transition(&conv, &ctx, &catalog, &mut rng, event) {
                Ok(result) => {
                    conv.apply(result);
                    if conv.state == ConvState::IdleMenu {
                        prop_assert!(conv.scratch.is_empty(), "Scratch leaked: {:?}", conv);
                    }
                    if let Some(tool) = conv.state.pending_tool() {
                        prop_assert!(
                            matches!(
                                catalog.get(tool).map(|t| t.kind),
                                Some(ToolKind::NeedsInput { .. })
                            ),
                            "Pending tool {} is not an input tool",
                            tool
                        );
                    }
                }
                Err(_) => {
                    // Ignored event leaves the record untouched
                    prop_assert_eq!(&conv, &before);
                }
            }
        }
    }

    // Invariant 2: Start and cancel always land in IdleMenu with clean scratch
    #[test]
    fn prop_start_and_cancel_reset(
        mut conv in arb_conversation(),
        cancel in any::<bool>(),
        seed in any::<u64>(),
    ) {
        let command = if cancel { Command::Cancel } else { Command::Start };
        let mut rng = StdRng::seed_from_u64(seed);
        let result = transition(
            &conv,
            &test_context(DiceRollPolicy::default()),
            &catalog(),
            &mut rng,
            Event::command(command),
        );
        prop_assert!(result.is_ok());
        let effects = conv.apply(result.unwrap());
        prop_assert_eq!(conv.state, ConvState::IdleMenu);
        prop_assert!(conv.scratch.is_empty());
        let shows_root_menu = effects
            .iter()
            .any(|e| matches!(e, Effect::RenderMenu { menu: MenuId::Root, .. }));
        prop_assert!(shows_root_menu);
    }

    // Invariant 3: Help never changes state or scratch
    #[test]
    fn prop_help_is_stateless(conv in arb_conversation(), seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let result = transition(
            &conv,
            &test_context(DiceRollPolicy::default()),
            &catalog(),
            &mut rng,
            Event::command(Command::Help),
        ).unwrap();
        let mut after = conv.clone();
        let effects = after.apply(result);
        prop_assert_eq!(after, conv);
        prop_assert_eq!(effects, vec![Effect::plain(HELP_TEXT)]);
    }

    // Invariant 4: Instant root tools always end in IdleMenu outside the dice submenu
    #[test]
    fn prop_instant_tools_return_to_idle(
        state in prop_oneof![Just(ConvState::IdleMenu), arb_awaiting_state()],
        tool in prop::sample::select(instant_root_ids()),
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let conv = Conversation { state, scratch: Scratch::default() };
        let result = transition(
            &conv,
            &test_context(DiceRollPolicy::default()),
            &catalog(),
            &mut rng,
            Event::select(tool),
        ).unwrap();
        prop_assert_eq!(result.new_state, ConvState::IdleMenu);
        prop_assert_eq!(result.effects.len(), 1);
    }

    // Invariant 5: Text input while awaiting never fails; rejection keeps the tool
    #[test]
    fn prop_text_input_resolves_or_reprompts(
        state in arb_awaiting_state(),
        text in arb_text(),
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let conv = Conversation { state, scratch: Scratch::default() };
        let result = transition(
            &conv,
            &test_context(DiceRollPolicy::default()),
            &catalog(),
            &mut rng,
            Event::text(text),
        );
        prop_assert!(result.is_ok(), "Text rejected as event: {:?}", result);
        let result = result.unwrap();
        match result.new_state {
            ConvState::IdleMenu => {
                prop_assert_eq!(result.effects.len(), 2);
            }
            other => {
                prop_assert_eq!(other, state);
                prop_assert_eq!(result.scratch.invalid_attempts(), 1);
            }
        }
    }

    // Invariant 6: The dice submenu only accepts dice and back
    #[test]
    fn prop_dice_submenu_is_restricted(
        tool in prop::sample::select(callback_ids()),
        policy in arb_policy(),
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let conv = Conversation { state: ConvState::DiceSubmenu, scratch: Scratch::default() };
        let is_die = tool.starts_with('d') && tool != "dice_menu";
        let is_back = tool == BACK_TO_MAIN;
        let result = transition(&conv, &test_context(policy), &catalog(), &mut rng, Event::select(tool));

        if is_die {
            let result = result.unwrap();
            let expected = match policy {
                DiceRollPolicy::StayInSubmenu => ConvState::DiceSubmenu,
                DiceRollPolicy::ReturnToMainMenu => ConvState::IdleMenu,
            };
            prop_assert_eq!(result.new_state, expected);
        } else if is_back {
            prop_assert_eq!(result.unwrap().new_state, ConvState::IdleMenu);
        } else {
            let is_unavailable = matches!(result, Err(TransitionError::SelectionNotAvailable { .. }));
            prop_assert!(is_unavailable);
        }
    }
}

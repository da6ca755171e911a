use cluedo_bot::{BotParams, Certainty, ChooserKind, DeductionBot};
use cluedo_core::{Catalog, Deal, Location, Observation, TurnOutcome};
use std::sync::Arc;

const MAX_TURNS: usize = 150;

fn seat_bots(catalog: &Arc<Catalog>, deal: &Deal, kind: ChooserKind, seed: u64) -> Vec<DeductionBot> {
    let players: Vec<String> = deal.players().map(str::to_string).collect();
    players
        .iter()
        .enumerate()
        .map(|(seat, name)| {
            let mut bot = DeductionBot::seeded(
                Arc::clone(catalog),
                players.clone(),
                name.clone(),
                kind,
                seed.wrapping_mul(31).wrapping_add(seat as u64),
                BotParams::default(),
            )
            .expect("bot is seated");
            let hand = deal.hand(name).expect("player was dealt a hand");
            bot.receive_hand(hand).expect("hand is consistent");
            bot
        })
        .collect()
}

/// Every `Yes` any bot holds must agree with the deal.
fn assert_sound(bot: &DeductionBot, deal: &Deal, seed: u64) {
    let grid = bot.knowledge();
    for card in grid.catalog().cards() {
        let truth = deal.location_of(card).expect("card was dealt");
        for location in grid.locations() {
            if grid.certainty(card, location) == Some(Certainty::Yes) {
                assert_eq!(
                    location, &truth,
                    "seed {seed}: {} placed {card} wrongly",
                    bot.name()
                );
            }
        }
        assert_ne!(
            grid.certainty(card, &truth),
            Some(Certainty::No),
            "seed {seed}: {} ruled out the true location of {card}",
            bot.name()
        );
    }
}

/// Plays one game; returns the turn of the first accusation.
fn play(deal: &Deal, bots: &mut [DeductionBot], seed: u64) -> Option<usize> {
    let seats = bots.len();
    for turn in 0..MAX_TURNS {
        let current = turn % seats;
        if let Some(accusation) = bots[current].should_accuse() {
            assert!(
                deal.check_accusation(&accusation),
                "seed {seed}: wrong accusation {accusation}"
            );
            return Some(turn + 1);
        }

        let suggestion = bots[current].make_suggestion();
        let suggester = bots[current].name().to_string();
        let mut outcome = TurnOutcome::undisproved(suggester, suggestion.clone());
        for offset in 1..seats {
            let seat = (current + offset) % seats;
            if let Some(card) = bots[seat].choose_card_to_show(&suggestion) {
                outcome = TurnOutcome::disproved(
                    outcome.suggester,
                    suggestion.clone(),
                    bots[seat].name(),
                    Some(card),
                );
                break;
            }
        }

        for (seat, bot) in bots.iter_mut().enumerate() {
            let seen = if seat == current {
                outcome.clone()
            } else {
                outcome.redacted()
            };
            bot.handle_event(&Observation::Turn(seen))
                .expect("truthful observations never contradict");
            assert_sound(bot, deal, seed);
        }
    }
    None
}

#[test]
fn bots_stay_sound_and_accuse_correctly() {
    let catalog = Arc::new(Catalog::standard());
    let mut solved = 0;
    for seed in 0u64..16 {
        let players: Vec<String> = ["Ann", "Bob", "Cat", "Dan"]
            .iter()
            .take(3 + (seed % 2) as usize)
            .map(|name| name.to_string())
            .collect();
        let deal = Deal::shuffled_with_seed(&catalog, &players, seed).expect("valid deal");
        let kind = if seed % 3 == 0 {
            ChooserKind::Deterministic
        } else {
            ChooserKind::Random
        };
        let mut bots = seat_bots(&catalog, &deal, kind, seed);
        if play(&deal, &mut bots, seed).is_some() {
            solved += 1;
        }
    }
    assert!(solved > 0, "no game reached an accusation");
}

#[test]
fn direct_reveals_feed_every_bot() {
    let catalog = Arc::new(Catalog::standard());
    let players: Vec<String> = vec!["Ann".into(), "Bob".into(), "Cat".into()];
    let deal = Deal::shuffled_with_seed(&catalog, &players, 3).expect("valid deal");
    let mut bots = seat_bots(&catalog, &deal, ChooserKind::Deterministic, 3);

    for (holder, cards) in deal.hands() {
        for card in cards {
            let reveal = Observation::DirectReveal {
                holder: holder.clone(),
                card: card.clone(),
            };
            for bot in bots.iter_mut() {
                bot.handle_event(&reveal).expect("reveal is consistent");
            }
        }
    }

    for bot in &bots {
        assert_sound(bot, &deal, 3);
        assert_eq!(bot.should_accuse().as_ref(), Some(deal.solution()));
        assert_eq!(
            bot.knowledge().holder(&deal.solution().room),
            Some(&Location::Solution)
        );
    }
}

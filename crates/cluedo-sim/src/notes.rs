//! Plain-text views of a bot's notebook and of table events.

use std::io::{self, Write};

use cluedo_bot::{Certainty, DeductionBot};
use cluedo_core::{GameEvent, Listener, Location};

pub fn symbol(certainty: Certainty) -> &'static str {
    match certainty {
        Certainty::Yes => "✔",
        Certainty::No => "✘",
        Certainty::Maybe => "·",
    }
}

/// One row per card in catalog order, one column per player plus the solution.
pub fn render_notes(bot: &DeductionBot) -> String {
    let grid = bot.knowledge();
    let catalog = bot.catalog();

    let mut header: Vec<String> = vec!["#".into(), "Card".into(), "Type".into()];
    header.extend(grid.locations().iter().map(|location| match location {
        Location::Player(name) => name.clone(),
        Location::Solution => "Solution".to_string(),
    }));

    let mut rows: Vec<Option<Vec<String>>> = Vec::with_capacity(catalog.len() + 2);
    let mut previous = None;
    for (index, card) in catalog.cards().iter().enumerate() {
        let category = catalog.category_of(card);
        if previous.is_some() && previous != category {
            rows.push(None);
        }
        previous = category;

        let mut row = vec![
            (index + 1).to_string(),
            card.name().to_string(),
            category.map(|c| c.to_string()).unwrap_or_default(),
        ];
        for location in grid.locations() {
            let certainty = grid.certainty(card, location).unwrap_or(Certainty::Maybe);
            row.push(symbol(certainty).to_string());
        }
        rows.push(Some(row));
    }

    let mut widths: Vec<usize> = header.iter().map(|cell| cell.chars().count()).collect();
    for row in rows.iter().flatten() {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let separator = widths
        .iter()
        .map(|width| "-".repeat(width + 2))
        .collect::<Vec<_>>()
        .join("+");

    let mut out = format!("{}'s notes\n", bot.name());
    out.push_str(&format_row(&header, &widths));
    out.push_str(&separator);
    out.push('\n');
    for row in &rows {
        match row {
            Some(cells) => out.push_str(&format_row(cells, &widths)),
            None => {
                out.push_str(&separator);
                out.push('\n');
            }
        }
    }
    out
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let mut line = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(column, (cell, width))| {
            let pad = width - cell.chars().count();
            // Numbers right-aligned, names left-aligned, symbols centred.
            match column {
                0 => format!(" {}{} ", " ".repeat(pad), cell),
                1 | 2 => format!(" {}{} ", cell, " ".repeat(pad)),
                _ => {
                    let left = pad / 2;
                    format!(" {}{}{} ", " ".repeat(left), cell, " ".repeat(pad - left))
                }
            }
        })
        .collect::<Vec<_>>()
        .join("|");
    line.truncate(line.trim_end().len());
    line.push('\n');
    line
}

/// Human-readable rendering of one event.
pub fn describe_event(event: &GameEvent) -> String {
    match event {
        GameEvent::GameReady { players } => {
            format!("--- New game: {} ---", players.join(", "))
        }
        GameEvent::TurnStarted { turn, player } => format!("\n--- Turn {turn}: {player} ---"),
        GameEvent::SuggestionMade { player, suggestion } => {
            format!("{player} suggests: {suggestion}")
        }
        GameEvent::Disproved {
            suggester,
            disprover,
        } => format!("-> {disprover} shows a card to {suggester}."),
        GameEvent::NotDisproved { .. } => "-> No player could show a card.".to_string(),
        GameEvent::GameOver {
            winner,
            accusation,
            solution,
            correct,
        } => match (winner, accusation) {
            (Some(player), Some(accusation)) if *correct => format!(
                "\n--- GAME OVER ---\n{player} accuses {accusation}: CORRECT, {player} wins!\nSolution: {solution}"
            ),
            (Some(player), Some(accusation)) => format!(
                "\n--- GAME OVER ---\n{player} accuses {accusation}: INCORRECT.\nSolution: {solution}"
            ),
            _ => format!(
                "\n--- GAME OVER ---\nNo accusation before the turn limit.\nSolution: {solution}"
            ),
        },
    }
}

/// Prints table events as they happen.
pub struct ConsoleRenderer<W: Write> {
    out: W,
}

impl ConsoleRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> ConsoleRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Listener for ConsoleRenderer<W> {
    fn on_event(&mut self, event: &GameEvent) {
        // Console output is best effort.
        let _ = writeln!(self.out, "{}", describe_event(event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cluedo_bot::{BotParams, Chooser};
    use cluedo_core::{Card, Catalog, Suggestion};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::Arc;

    fn bot() -> DeductionBot {
        let players = vec!["Ann".to_string(), "Bob".to_string()];
        let mut bot = DeductionBot::new(
            Arc::new(Catalog::standard()),
            players,
            "Ann",
            Chooser::deterministic(),
            StdRng::seed_from_u64(1),
            BotParams::default(),
        )
        .expect("seated");
        bot.receive_hand(&[Card::from("Rope")]).expect("hand");
        bot
    }

    #[test]
    fn notes_list_every_card_with_symbols() {
        let notes = render_notes(&bot());
        let lines: Vec<&str> = notes.lines().collect();
        assert_eq!(lines[0], "Ann's notes");
        assert!(lines[1].contains("Card") && lines[1].contains("Solution"));
        // Title, header, rule, 21 cards and two category separators.
        assert_eq!(lines.len(), 3 + 21 + 2);

        let rope = lines
            .iter()
            .find(|line| line.contains("Rope"))
            .expect("rope row");
        assert!(rope.contains("weapon"));
        assert_eq!(rope.matches('✔').count(), 1);
        assert_eq!(rope.matches('✘').count(), 2);

        let hall = lines.iter().find(|line| line.contains("Hall")).expect("hall row");
        assert_eq!(hall.matches('·').count(), 3);
    }

    #[test]
    fn renderer_writes_one_line_per_event() {
        let mut renderer = ConsoleRenderer::new(Vec::new());
        renderer.on_event(&GameEvent::TurnStarted {
            turn: 4,
            player: "Bob".into(),
        });
        renderer.on_event(&GameEvent::SuggestionMade {
            player: "Bob".into(),
            suggestion: Suggestion::new("Mr. Green".into(), "Rope".into(), "Hall".into()),
        });
        let text = String::from_utf8(renderer.into_inner()).expect("utf8");
        assert!(text.contains("--- Turn 4: Bob ---"));
        assert!(text.contains("Bob suggests: Mr. Green, Rope, Hall"));
    }

    #[test]
    fn game_over_reports_incorrect_accusation() {
        let solution = Suggestion::new("Mr. Green".into(), "Rope".into(), "Hall".into());
        let wrong = Suggestion::new("Mr. Green".into(), "Rope".into(), "Study".into());
        let line = describe_event(&GameEvent::GameOver {
            winner: Some("Ann".into()),
            accusation: Some(wrong),
            solution,
            correct: false,
        });
        assert!(line.contains("INCORRECT"));
        assert!(line.contains("Solution: Mr. Green, Rope, Hall"));
    }
}

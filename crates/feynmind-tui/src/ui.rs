use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use feynmind_core::{QuizFlow, Role};

use crate::app::{App, ConnectionStatus, Screen};

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Screen body
            Constraint::Length(1), // Status bar
        ])
        .split(f.size());

    draw_header(f, app, chunks[0]);
    match app.screen {
        Screen::Home => draw_home(f, app, chunks[1]),
        Screen::Chat => draw_chat(f, app, chunks[1]),
        Screen::Quiz => draw_quiz(f, app, chunks[1]),
    }
    draw_status_bar(f, app, chunks[2]);
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let status_color = match app.status {
        ConnectionStatus::Connected => Color::Green,
        ConnectionStatus::Disconnected => Color::Red,
        ConnectionStatus::Connecting => Color::Yellow,
    };

    let mut spans = vec![
        Span::styled(
            " FeynMind ",
            Style::default()
                .add_modifier(Modifier::BOLD)
                .fg(Color::Cyan),
        ),
        Span::styled("|", Style::default().fg(Color::Gray)),
    ];
    for screen in [Screen::Home, Screen::Chat, Screen::Quiz] {
        let style = if screen == app.screen {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {} ", screen.title()), style));
    }
    spans.push(Span::styled("|  ", Style::default().fg(Color::Gray)));
    spans.push(Span::styled(
        format!("{}", app.status),
        Style::default().fg(status_color),
    ));
    if !app.store.topic().is_empty() {
        spans.push(Span::styled("  |  ", Style::default().fg(Color::Gray)));
        spans.push(Span::styled(
            app.store.topic().to_string(),
            Style::default().fg(Color::White),
        ));
    }

    let header = Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue)),
        )
        .alignment(Alignment::Left);

    f.render_widget(header, area);
}

fn draw_home(f: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  What do you want to learn? ", Style::default().fg(Color::White)),
        ]),
        Line::from(vec![
            Span::styled("  > ", Style::default().fg(Color::Green)),
            Span::styled(app.topic_input.as_str(), Style::default().fg(Color::White)),
            Span::styled("▌", Style::default().fg(Color::Green)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Difficulty: ", Style::default().fg(Color::White)),
            Span::styled(
                format!("{}", app.store.difficulty()),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::styled("  (Ctrl+D to change)", Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(""),
    ];
    if app.store.topic().is_empty() {
        lines.push(Line::from(Span::styled(
            "  Enter a topic to unlock the tutor and the quiz.",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            format!("  Current topic: {}", app.store.topic()),
            Style::default().fg(Color::DarkGray),
        )));
    }

    let body = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Pick a topic")
                .border_style(Style::default().fg(Color::Blue)),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(body, area);
}

fn draw_chat(f: &mut Frame, app: &App, area: Rect) {
    let mut constraints = vec![Constraint::Min(5)];
    let extras = chat_extras(app);
    if !extras.is_empty() {
        constraints.push(Constraint::Length(extras.len() as u16 + 2));
    }
    constraints.push(Constraint::Length(3)); // transcript input
    constraints.push(Constraint::Length(3)); // mic / minutes

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    draw_chat_history(f, app, chunks[0]);
    let mut next = 1;
    if !extras.is_empty() {
        let panel = Paragraph::new(extras).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue)),
        );
        f.render_widget(panel, chunks[next]);
        next += 1;
    }
    draw_transcript_input(f, app, chunks[next]);
    draw_mic_panel(f, app, chunks[next + 1]);
}

/// Notice, followup suggestions, and the quiz suggestion banner.
fn chat_extras(app: &App) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    if let Some(notice) = &app.notice {
        lines.push(Line::from(Span::styled(
            notice.as_str(),
            Style::default().fg(Color::Red),
        )));
    }
    for (i, followup) in app.followups.iter().enumerate() {
        lines.push(Line::from(vec![
            Span::styled(
                format!("[F{}] ", i + 1),
                Style::default().fg(Color::Yellow),
            ),
            Span::styled(followup.as_str(), Style::default().fg(Color::White)),
        ]));
    }
    if app.suggest_quiz {
        lines.push(Line::from(Span::styled(
            "You seem ready. Press Tab to take the quiz.",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )));
    }
    lines
}

fn draw_chat_history(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .store
        .chat_history()
        .iter()
        .skip(app.scroll_offset)
        .map(|msg| {
            let (prefix, style) = match msg.role {
                Role::User => ("You: ", Style::default().fg(Color::Cyan)),
                Role::Assistant => ("Tutor: ", Style::default().fg(Color::Green)),
            };
            let mut lines = vec![Line::from(vec![
                Span::styled(prefix, style.add_modifier(Modifier::BOLD)),
                Span::styled(msg.content.clone(), style),
            ])];
            lines.push(Line::from(""));
            ListItem::new(Text::from(lines))
        })
        .collect();

    let title = if app.store.topic().is_empty() {
        "Conversation (set a topic on Home first)".to_string()
    } else {
        format!("Explain \"{}\" back to the tutor", app.store.topic())
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(Color::Blue)),
    );
    f.render_widget(list, area);
}

fn draw_transcript_input(f: &mut Frame, app: &App, area: Rect) {
    let input_text = if app.chat_pending {
        Line::from(vec![
            Span::styled("> ", Style::default().fg(Color::Yellow)),
            Span::styled(
                "Analyzing...",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
            ),
        ])
    } else if app.store.transcript().is_empty() {
        Line::from(vec![
            Span::styled("> ", Style::default().fg(Color::Green)),
            Span::styled(
                "Type (or dictate) what you know, then press Enter...",
                Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
            ),
        ])
    } else {
        Line::from(vec![
            Span::styled("> ", Style::default().fg(Color::Green)),
            Span::styled(app.store.transcript().to_string(), Style::default().fg(Color::White)),
            Span::styled("▌", Style::default().fg(Color::Green)),
        ])
    };

    let input = Paragraph::new(input_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Your explanation")
                .border_style(Style::default().fg(Color::Blue)),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(input, area);
}

fn draw_mic_panel(f: &mut Frame, app: &App, area: Rect) {
    let mic = if !app.speech.is_available() {
        Span::styled(
            "Mic unavailable (no dictation command configured)",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )
    } else if app.speech.is_recording() {
        Span::styled(
            "● Recording (Ctrl+R to stop)",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled("○ Mic idle (Ctrl+R to dictate)", Style::default().fg(Color::Gray))
    };

    let minutes = app.store.mic_timer().whole_minutes();
    let save = if app.minutes_pending {
        Span::styled("saving...", Style::default().fg(Color::Yellow))
    } else if minutes >= 1 {
        Span::styled("Ctrl+S to save", Style::default().fg(Color::Green))
    } else {
        Span::styled("nothing to save yet", Style::default().fg(Color::DarkGray))
    };

    let line = Line::from(vec![
        mic,
        Span::styled("  |  ", Style::default().fg(Color::Gray)),
        Span::styled(
            format!("Listening time: {} min ", minutes),
            Style::default().fg(Color::White),
        ),
        save,
    ]);

    let panel = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue)),
    );
    f.render_widget(panel, area);
}

fn draw_quiz(f: &mut Frame, app: &App, area: Rect) {
    match &app.quiz_flow {
        QuizFlow::NoTopic => {
            draw_quiz_message(f, area, "Enter a topic on the Home screen to generate a quiz.")
        }
        QuizFlow::Loading => draw_quiz_message(f, area, "Generating quiz..."),
        QuizFlow::Failed { message } => {
            let lines = vec![
                Line::from(Span::styled(
                    message.as_str(),
                    Style::default().fg(Color::Red),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "Press r to try again.",
                    Style::default().fg(Color::Gray),
                )),
            ];
            let panel = Paragraph::new(lines)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title("Quiz")
                        .border_style(Style::default().fg(Color::Red)),
                )
                .wrap(Wrap { trim: true });
            f.render_widget(panel, area);
        }
        QuizFlow::Ready { .. } | QuizFlow::Submitted { .. } => draw_quiz_questions(f, app, area),
    }
}

fn draw_quiz_message(f: &mut Frame, area: Rect, message: &str) {
    let panel = Paragraph::new(message)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Quiz")
                .border_style(Style::default().fg(Color::Blue)),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(panel, area);
}

fn draw_quiz_questions(f: &mut Frame, app: &App, area: Rect) {
    let Some(quiz) = app.quiz_flow.quiz() else {
        return;
    };
    let answers = app.quiz_flow.answers();
    let submitted = app.quiz_flow.is_submitted();

    let mut items: Vec<ListItem> = Vec::new();
    for (idx, question) in quiz.questions.iter().enumerate() {
        let selected = idx == app.selected_question;
        let marker = if selected { "» " } else { "  " };
        let chosen = answers.and_then(|a| a.chosen(&question.id));

        let mut lines = vec![Line::from(vec![
            Span::styled(
                format!("{}{}. {}", marker, idx + 1, question.prompt),
                if selected {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                },
            ),
            Span::styled(
                format!("  [{}]", question.bloom),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ),
        ])];

        for (choice_idx, choice) in question.choices.iter().enumerate() {
            let is_chosen = chosen == Some(choice_idx);
            let style = if submitted {
                if choice_idx == question.answer_index {
                    Style::default().fg(Color::Green)
                } else if is_chosen {
                    Style::default().fg(Color::Red)
                } else {
                    Style::default().fg(Color::Gray)
                }
            } else if is_chosen {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            let mark = if is_chosen { "(x)" } else { "( )" };
            lines.push(Line::from(Span::styled(
                format!("     {} {}) {}", mark, choice_idx + 1, choice),
                style,
            )));
        }

        if submitted {
            lines.push(Line::from(Span::styled(
                format!("     └─ {}", question.explanation),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }
        lines.push(Line::from(""));
        items.push(ListItem::new(Text::from(lines)));
    }

    let title = if let Some(record) = app.quiz_flow.record() {
        format!(
            "Quiz: {} | Score {}/{} ({}%)",
            quiz.topic, record.score, record.questions, record.accuracy
        )
    } else {
        let answered = answers.map(|a| a.len()).unwrap_or(0);
        format!(
            "Quiz: {} ({} · {} questions · {}/{} answered)",
            quiz.topic,
            quiz.difficulty,
            quiz.questions.len(),
            answered,
            quiz.questions.len()
        )
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(Color::Blue)),
    );
    f.render_widget(list, area);
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let help = match app.screen {
        Screen::Home => "[Enter] Start  [Ctrl+D] Difficulty  [Tab] Screens  [Ctrl+C] Quit",
        Screen::Chat => {
            "[Enter] Analyze  [Ctrl+R] Mic  [Ctrl+S] Save minutes  [Ctrl+L] Clear  [F1-F3] Followup  [Tab] Screens  [Ctrl+C] Quit"
        }
        Screen::Quiz => {
            if app.quiz_flow.is_submitted() {
                "[n] New quiz  [Tab] Screens  [Ctrl+C] Quit"
            } else {
                "[↑↓] Question  [1-4] Answer  [Enter] Submit  [n] New quiz  [Tab] Screens  [Ctrl+C] Quit"
            }
        }
    };

    let pending = if app.quiz_pending || app.chat_pending || app.minutes_pending {
        " ◐ working..."
    } else {
        ""
    };

    let status_bar = Paragraph::new(format!(" {}{}", help, pending))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::REVERSED));
    f.render_widget(status_bar, area);
}

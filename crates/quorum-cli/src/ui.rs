use std::io;
use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Clear, List, ListItem, ListState, Paragraph, Row, Table, Wrap,
};
use ratatui::Terminal;

use quorum_client::commands::ClientCommand;
use quorum_core::actions::{DashAction, RuntimeAction, UserAction};
use quorum_core::codec::{action_headers, action_values};
use quorum_core::reducer::{reduce, DashEffect};
use quorum_core::state::{form_fields, DashState, FormField, NoticeLevel, PollPhase};

struct TuiGuard;

impl Drop for TuiGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show);
    }
}

struct Palette {
    accent: Color,
    border: Color,
    danger: Color,
    dim: Color,
}

const PALETTE: Palette = Palette {
    accent: Color::Cyan,
    border: Color::DarkGray,
    danger: Color::Red,
    dim: Color::Gray,
};

pub fn run(
    mut state: DashState,
    node_url: String,
    events: mpsc::Receiver<RuntimeAction>,
    selection: tokio::sync::watch::Sender<Option<String>>,
    commands: tokio::sync::mpsc::UnboundedSender<ClientCommand>,
) -> Result<(), Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, crossterm::cursor::Hide)?;
    let _guard = TuiGuard; // Ensures terminal is restored on exit or panic

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    run_app(
        &mut terminal,
        &mut state,
        &node_url,
        events,
        selection,
        commands,
    )
    .map_err(|e| e.into())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    state: &mut DashState,
    node_url: &str,
    events: mpsc::Receiver<RuntimeAction>,
    selection: tokio::sync::watch::Sender<Option<String>>,
    commands: tokio::sync::mpsc::UnboundedSender<ClientCommand>,
) -> io::Result<()> {
    let mut alert: Option<String> = None;

    loop {
        let mut effects = Vec::new();
        while let Ok(action) = events.try_recv() {
            effects.extend(reduce(state, DashAction::Runtime(action)));
        }
        // Effects are applied before drawing so an alert raised by this
        // batch shows up on the very frame that reflects it.
        apply_effects(effects, &mut alert, &selection, &commands);

        terminal.draw(|f| ui(f, state, node_url, alert.as_deref()))?;

        if event::poll(Duration::from_millis(16))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == event::KeyEventKind::Press {
                    if alert.is_some() {
                        alert = None;
                    } else {
                        let mut effects = Vec::new();
                        if let KeyOutcome::Exit = handle_key(key, state, &mut effects) {
                            return Ok(());
                        }
                        apply_effects(effects, &mut alert, &selection, &commands);
                    }
                }
            }
        }
    }
}

fn apply_effects(
    effects: Vec<DashEffect>,
    alert: &mut Option<String>,
    selection: &tokio::sync::watch::Sender<Option<String>>,
    commands: &tokio::sync::mpsc::UnboundedSender<ClientCommand>,
) {
    for effect in effects {
        match effect {
            DashEffect::RequestFrame => {}
            DashEffect::Alert(message) => *alert = Some(message),
            DashEffect::SelectionChanged(id) => {
                let _ = selection.send(id);
            }
            DashEffect::SubmitProposal(action) => {
                let _ = commands.send(ClientCommand::SubmitProposal(action));
            }
            DashEffect::DeleteProposal { proposal_id } => {
                let _ = commands.send(ClientCommand::DeleteProposal { proposal_id });
            }
            DashEffect::FetchContextVariables => {
                let _ = commands.send(ClientCommand::FetchContextVariables);
            }
        }
    }
}

enum KeyOutcome {
    Continue,
    Exit,
}

fn handle_key(key: KeyEvent, state: &mut DashState, effects: &mut Vec<DashEffect>) -> KeyOutcome {
    if state.form.open {
        effects.extend(handle_form_key(key, state));
        return KeyOutcome::Continue;
    }

    let action = match key.code {
        KeyCode::Char('q') => return KeyOutcome::Exit,
        KeyCode::Char('j') | KeyCode::Down => Some(UserAction::SelectNextProposal),
        KeyCode::Char('k') | KeyCode::Up => Some(UserAction::SelectPrevProposal),
        KeyCode::Esc => Some(UserAction::SelectProposal(None)),
        KeyCode::Char('n') => Some(UserAction::OpenProposalForm),
        KeyCode::Char('d') => Some(UserAction::DeleteSelectedProposal),
        KeyCode::Char('v') => Some(UserAction::RefreshContextVariables),
        _ => None,
    };
    if let Some(action) = action {
        effects.extend(reduce(state, DashAction::User(action)));
    }
    KeyOutcome::Continue
}

fn handle_form_key(key: KeyEvent, state: &mut DashState) -> Vec<DashEffect> {
    let on_kind_selector = state.form.focus == 0;
    let action = match key.code {
        KeyCode::Esc => UserAction::CloseProposalForm,
        KeyCode::Tab | KeyCode::Down => UserAction::FormNextField,
        KeyCode::BackTab | KeyCode::Up => UserAction::FormPrevField,
        KeyCode::Left if on_kind_selector => UserAction::FormKindPrev,
        KeyCode::Right if on_kind_selector => UserAction::FormKindNext,
        KeyCode::Enter => UserAction::SubmitProposalForm,
        KeyCode::Backspace => UserAction::FormBackspace,
        KeyCode::Char('a') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            UserAction::FormAddArgument
        }
        KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            UserAction::FormRemoveArgument
        }
        KeyCode::Char(c) => UserAction::FormInput(c),
        _ => return Vec::new(),
    };
    reduce(state, DashAction::User(action))
}

fn ui(f: &mut ratatui::Frame, state: &DashState, node_url: &str, alert: Option<&str>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(8),    // Proposals + detail
            Constraint::Length(8), // Context variables + notices
            Constraint::Length(1), // Footer
        ])
        .split(f.area());

    render_header(f, chunks[0], state, node_url);

    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(40), Constraint::Min(0)])
        .split(chunks[1]);
    render_proposal_list(f, main[0], state);
    render_detail(f, main[1], state);

    let lower = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);
    render_context_variables(f, lower[0], state);
    render_notices(f, lower[1], state);

    render_footer(f, chunks[3], state);

    if state.form.open {
        render_form(f, state);
    }
    if let Some(message) = alert {
        render_alert(f, message);
    }
}

fn render_header(f: &mut ratatui::Frame, area: Rect, state: &DashState, node_url: &str) {
    let poll = match state.poll.phase {
        PollPhase::Idle => "idle".to_string(),
        phase => format!("{}…", phase.label()),
    };
    let error = state
        .poll
        .last_error
        .as_deref()
        .map(|err| format!(" | last error: {err}"))
        .unwrap_or_default();
    let text = format!(
        "Quorum | {node_url} | ctx:{} | proposals:{} | poll:{poll} tick:{}{error}",
        state.identity.context_id, state.cache.proposal_count, state.poll.ticks,
    );
    let style = if state.poll.last_error.is_some() {
        Style::default().fg(PALETTE.danger)
    } else {
        Style::default().fg(PALETTE.accent)
    };
    let header = Paragraph::new(text).style(style).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(PALETTE.border)),
    );
    f.render_widget(header, area);
}

fn render_proposal_list(f: &mut ratatui::Frame, area: Rect, state: &DashState) {
    let items: Vec<ListItem> = state
        .cache
        .proposals
        .iter()
        .map(|proposal| {
            let scopes: Vec<&str> = proposal.actions.iter().map(|action| action.scope()).collect();
            let mut spans = vec![Span::raw(format!("{} [{}]", proposal.id, scopes.join(",")))];
            if state.is_author(proposal) {
                spans.push(Span::styled(
                    " (yours)",
                    Style::default().fg(PALETTE.accent),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let mut list_state = ListState::default();
    list_state.select(state.selection.selected_proposal.as_deref().and_then(|id| {
        state
            .cache
            .proposals
            .iter()
            .position(|proposal| proposal.id == id)
    }));

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(PALETTE.border))
                .title(format!("Proposals ({})", state.cache.proposals.len())),
        )
        .highlight_style(
            Style::default()
                .fg(PALETTE.accent)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    f.render_stateful_widget(list, area, &mut list_state);
}

fn render_detail(f: &mut ratatui::Frame, area: Rect, state: &DashState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(PALETTE.border))
        .title("Details");

    let Some(proposal) = state.selected_proposal() else {
        let hint = Paragraph::new("Select a proposal (j/k) to inspect it")
            .style(Style::default().fg(PALETTE.dim))
            .block(block);
        f.render_widget(hint, area);
        return;
    };

    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut head_lines = vec![
        Line::from(vec![
            Span::styled("Id: ", Style::default().fg(PALETTE.dim)),
            Span::raw(proposal.id.clone()),
        ]),
        Line::from(vec![
            Span::styled("Author: ", Style::default().fg(PALETTE.dim)),
            Span::raw(proposal.author_id.clone()),
            Span::raw(if state.is_author(proposal) {
                " (you)"
            } else {
                ""
            }),
        ]),
        Line::from(vec![
            Span::styled("Approvals: ", Style::default().fg(PALETTE.dim)),
            Span::raw(match state.cache.selected_approvals {
                Some(count) => count.to_string(),
                None => "…".to_string(),
            }),
        ]),
    ];
    if !state.cache.approvers.is_empty() {
        head_lines.push(Line::from(vec![
            Span::styled("Approved by: ", Style::default().fg(PALETTE.dim)),
            Span::raw(state.cache.approvers.join(", ")),
        ]));
    }
    let head_height = head_lines.len() as u16;

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(head_height), Constraint::Min(0)])
        .split(inner);
    f.render_widget(Paragraph::new(head_lines).wrap(Wrap { trim: true }), sections[0]);

    // One table per action; unknown scopes still get their scope column.
    let mut action_areas = Vec::new();
    let mut remaining = sections[1];
    for _ in &proposal.actions {
        if remaining.height < 4 {
            break;
        }
        let split = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0)])
            .split(remaining);
        action_areas.push(split[0]);
        remaining = split[1];
    }
    for (action, slot) in proposal.actions.iter().zip(action_areas) {
        let headers = action_headers(action);
        let values = action_values(action);
        let widths: Vec<Constraint> = headers
            .iter()
            .map(|_| Constraint::Ratio(1, headers.len() as u32))
            .collect();
        let table = Table::new(vec![Row::new(values)], widths)
            .header(
                Row::new(headers.clone())
                    .style(Style::default().fg(PALETTE.accent)),
            )
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(PALETTE.border))
                    .title(action.scope().to_string()),
            );
        f.render_widget(table, slot);
    }
}

fn render_context_variables(f: &mut ratatui::Frame, area: Rect, state: &DashState) {
    let rows: Vec<Row> = state
        .cache
        .context_variables
        .iter()
        .map(|variable| Row::new(vec![variable.key.clone(), variable.value.clone()]))
        .collect();
    let table = Table::new(rows, [Constraint::Percentage(40), Constraint::Percentage(60)])
        .header(Row::new(vec!["Key", "Value"]).style(Style::default().fg(PALETTE.accent)))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(PALETTE.border))
                .title("Context Variables (v to refresh)"),
        );
    f.render_widget(table, area);
}

fn render_notices(f: &mut ratatui::Frame, area: Rect, state: &DashState) {
    let visible = area.height.saturating_sub(2) as usize;
    let items: Vec<ListItem> = state
        .notices
        .iter()
        .rev()
        .take(visible)
        .map(|notice| {
            let style = match notice.level {
                NoticeLevel::Info => Style::default().fg(PALETTE.dim),
                NoticeLevel::Error => Style::default().fg(PALETTE.danger),
            };
            ListItem::new(Line::from(Span::styled(
                format!("[{}] {}", notice.level.label(), notice.message),
                style,
            )))
        })
        .collect();
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(PALETTE.border))
            .title("Notices"),
    );
    f.render_widget(list, area);
}

fn render_footer(f: &mut ratatui::Frame, area: Rect, state: &DashState) {
    let hints = if state.form.open {
        "Tab next field | Left/Right action type | Ctrl+a/Ctrl+r argument rows | Enter submit | Esc cancel"
    } else {
        "j/k select | n new proposal | d delete | v refresh variables | Esc deselect | q quit"
    };
    let footer = Paragraph::new(hints)
        .style(Style::default().fg(PALETTE.dim))
        .alignment(Alignment::Center);
    f.render_widget(footer, area);
}

fn render_form(f: &mut ratatui::Frame, state: &DashState) {
    let area = centered_rect(60, 70, f.area());
    f.render_widget(Clear, area);

    let title = if state.form.submitting {
        "New Proposal (submitting…)"
    } else {
        "New Proposal"
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(PALETTE.accent))
        .title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let fields = form_fields(&state.form.form);
    let mut lines = Vec::new();
    for (index, field) in fields.iter().enumerate() {
        let focused = index == state.form.focus;
        let marker = if focused { "> " } else { "  " };
        let value = field_value(state, *field);
        let label_style = if focused {
            Style::default()
                .fg(PALETTE.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(PALETTE.dim)
        };
        let shown = if *field == FormField::ActionKind {
            format!("< {value} >")
        } else if focused {
            format!("{value}_")
        } else {
            value
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{marker}{}: ", field_label(*field)), label_style),
            Span::raw(shown),
        ]));
    }
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn field_label(field: FormField) -> String {
    match field {
        FormField::ArgumentKey(index) => format!("{} {}", field.label(), index + 1),
        FormField::ArgumentValue(index) => format!("{} {}", field.label(), index + 1),
        _ => field.label().to_string(),
    }
}

fn field_value(state: &DashState, field: FormField) -> String {
    let form = &state.form.form;
    match field {
        FormField::ActionKind => form.action_kind.clone(),
        FormField::ReceiverId => form.receiver_id.clone(),
        FormField::Amount => form.amount.clone(),
        FormField::ContractId => form.contract_id.clone(),
        FormField::MethodName => form.method_name.clone(),
        FormField::ArgumentKey(index) => form
            .arguments
            .get(index)
            .map(|row| row.key.clone())
            .unwrap_or_default(),
        FormField::ArgumentValue(index) => form
            .arguments
            .get(index)
            .map(|row| row.value.clone())
            .unwrap_or_default(),
        FormField::Deposit => form.deposit.clone(),
        FormField::MinApprovals => form.min_approvals.clone(),
        FormField::MaxActiveProposals => form.max_active_proposals.clone(),
        FormField::ContextKey => form.context_key.clone(),
        FormField::ContextValue => form.context_value.clone(),
    }
}

fn render_alert(f: &mut ratatui::Frame, message: &str) {
    let area = centered_rect(50, 20, f.area());
    f.render_widget(Clear, area);
    let paragraph = Paragraph::new(vec![
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "press any key",
            Style::default().fg(PALETTE.dim),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(PALETTE.accent))
            .title("Notice"),
    );
    f.render_widget(paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

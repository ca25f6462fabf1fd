//! Customer information input form.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::domain::{
    Contract, PaymentMethod, RawInputs, DEFAULT_MONTHLY_CHARGES, DEFAULT_TENURE,
    DEFAULT_TOTAL_CHARGES, TENURE_MAX,
};
use crate::tui::styles::RetentionTheme;

/// Longest accepted charge buffer; keeps parsed values finite.
const MAX_CHARGE_CHARS: usize = 12;

/// Focusable rows of the form, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Tenure,
    MonthlyCharges,
    TotalCharges,
    Contract,
    PaymentMethod,
    Submit,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Self::Tenure,
        Self::MonthlyCharges,
        Self::TotalCharges,
        Self::Contract,
        Self::PaymentMethod,
        Self::Submit,
    ];

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Tenure => "Tenure (months)",
            Self::MonthlyCharges => "Monthly Charges",
            Self::TotalCharges => "Total Charges",
            Self::Contract => "Contract Type",
            Self::PaymentMethod => "Payment Method",
            Self::Submit => "Predict Churn Risk",
        }
    }

    fn hint(&self) -> &'static str {
        match self {
            Self::Tenure => "0-72",
            Self::MonthlyCharges | Self::TotalCharges => ">= 0",
            _ => "",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }
}

/// Form state
#[derive(Debug, Clone)]
pub struct FormState {
    pub tenure: String,
    pub monthly_charges: String,
    pub total_charges: String,
    pub contract: Contract,
    pub payment_method: PaymentMethod,
    pub selected_field: Field,
    pub error_message: Option<String>,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            tenure: DEFAULT_TENURE.to_string(),
            monthly_charges: format!("{DEFAULT_MONTHLY_CHARGES:.1}"),
            total_charges: format!("{DEFAULT_TOTAL_CHARGES:.1}"),
            contract: Contract::default(),
            payment_method: PaymentMethod::default(),
            selected_field: Field::Tenure,
            error_message: None,
        }
    }
}

impl FormState {
    /// Move to the next field
    pub fn next_field(&mut self) {
        let i = self.selected_field.index();
        self.selected_field = Field::ALL[(i + 1) % Field::ALL.len()];
    }

    /// Move to the previous field
    pub fn prev_field(&mut self) {
        let i = self.selected_field.index();
        self.selected_field = Field::ALL[(i + Field::ALL.len() - 1) % Field::ALL.len()];
    }

    fn buffer_mut(&mut self) -> Option<&mut String> {
        match self.selected_field {
            Field::Tenure => Some(&mut self.tenure),
            Field::MonthlyCharges => Some(&mut self.monthly_charges),
            Field::TotalCharges => Some(&mut self.total_charges),
            _ => None,
        }
    }

    /// Add a character to the current numeric field.
    ///
    /// Keystrokes that would leave the field outside its bounds are dropped.
    /// Returns whether the character was accepted.
    pub fn input_char(&mut self, c: char) -> bool {
        let field = self.selected_field;
        let Some(buf) = self.buffer_mut() else {
            return false;
        };

        let candidate = match field {
            Field::Tenure => {
                if !c.is_ascii_digit() {
                    return false;
                }
                let candidate = if buf.as_str() == "0" {
                    c.to_string()
                } else {
                    format!("{buf}{c}")
                };
                match candidate.parse::<i64>() {
                    Ok(v) if v <= TENURE_MAX => candidate,
                    _ => return false,
                }
            }
            _ => {
                let accepted = c.is_ascii_digit() || (c == '.' && !buf.contains('.'));
                if !accepted || buf.len() >= MAX_CHARGE_CHARS {
                    return false;
                }
                if c == '.' && buf.is_empty() {
                    "0.".to_string()
                } else {
                    format!("{buf}{c}")
                }
            }
        };

        *buf = candidate;
        self.error_message = None;
        true
    }

    /// Delete the last character
    pub fn delete_char(&mut self) {
        if let Some(buf) = self.buffer_mut() {
            buf.pop();
        }
    }

    /// Clear the current field
    pub fn clear_field(&mut self) {
        if let Some(buf) = self.buffer_mut() {
            buf.clear();
        }
    }

    /// Step the selected choice field forward.
    pub fn next_choice(&mut self) {
        match self.selected_field {
            Field::Contract => self.contract = self.contract.next(),
            Field::PaymentMethod => self.payment_method = self.payment_method.next(),
            _ => {}
        }
    }

    /// Step the selected choice field backward.
    pub fn prev_choice(&mut self) {
        match self.selected_field {
            Field::Contract => self.contract = self.contract.prev(),
            Field::PaymentMethod => self.payment_method = self.payment_method.prev(),
            _ => {}
        }
    }

    /// Current form values.
    ///
    /// # Errors
    /// Returns a message naming the first empty or unparseable field.
    pub fn raw_inputs(&self) -> Result<RawInputs, String> {
        fn required<'a>(field: Field, buf: &'a str) -> Result<&'a str, String> {
            if buf.is_empty() {
                Err(format!("{}: value required", field.label()))
            } else {
                Ok(buf)
            }
        }

        let tenure = required(Field::Tenure, &self.tenure)?
            .parse::<i64>()
            .map_err(|_| format!("{}: Invalid number", Field::Tenure.label()))?;
        let monthly_charges = required(Field::MonthlyCharges, &self.monthly_charges)?
            .parse::<f64>()
            .map_err(|_| format!("{}: Invalid number", Field::MonthlyCharges.label()))?;
        let total_charges = required(Field::TotalCharges, &self.total_charges)?
            .parse::<f64>()
            .map_err(|_| format!("{}: Invalid number", Field::TotalCharges.label()))?;

        Ok(RawInputs {
            tenure,
            monthly_charges,
            total_charges,
            contract: self.contract,
            payment_method: self.payment_method,
        })
    }

    fn value(&self, field: Field) -> String {
        match field {
            Field::Tenure => self.tenure.clone(),
            Field::MonthlyCharges => self.monthly_charges.clone(),
            Field::TotalCharges => self.total_charges.clone(),
            Field::Contract => self.contract.to_string(),
            Field::PaymentMethod => self.payment_method.to_string(),
            Field::Submit => String::new(),
        }
    }
}

/// Render the customer information form
pub fn render_form(f: &mut Frame, area: Rect, state: &FormState) {
    let block = Block::default()
        .title(Span::styled(" Customer Information ", RetentionTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(RetentionTheme::border());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Fields
            Constraint::Length(2), // Footer/error
        ])
        .split(inner);

    render_fields(f, chunks[0], state);
    render_form_footer(f, chunks[1], state);
}

/// Rows taken by one field: label line plus value line.
const FIELD_ROWS: u16 = 2;

fn render_fields(f: &mut Frame, area: Rect, state: &FormState) {
    let constraints: Vec<Constraint> = Field::ALL
        .iter()
        .map(|field| match field {
            Field::Submit => Constraint::Length(1),
            _ => Constraint::Length(FIELD_ROWS),
        })
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (i, field) in Field::ALL.iter().enumerate() {
        let is_selected = *field == state.selected_field;

        if *field == Field::Submit {
            let style = if is_selected {
                RetentionTheme::selected()
            } else {
                RetentionTheme::focused()
            };
            let button = Paragraph::new(Line::from(Span::styled(
                format!(" [ {} ]", field.label()),
                style,
            )));
            f.render_widget(button, chunks[i]);
            continue;
        }

        let (rule_style, label_style) = if is_selected {
            (RetentionTheme::border_focused(), RetentionTheme::focused())
        } else {
            (RetentionTheme::border(), RetentionTheme::text_secondary())
        };

        let value = state.value(*field);
        let value_line = match field {
            Field::Contract | Field::PaymentMethod => Line::from(vec![
                Span::styled(" ◀ ", RetentionTheme::key_hint()),
                Span::styled(value, RetentionTheme::text()),
                Span::styled(" ▶", RetentionTheme::key_hint()),
            ]),
            _ => Line::from(vec![
                Span::raw(" "),
                if value.is_empty() {
                    Span::styled(field.hint(), RetentionTheme::text_muted())
                } else {
                    Span::styled(value, RetentionTheme::text())
                },
                if is_selected {
                    Span::styled("▌", RetentionTheme::cursor())
                } else {
                    Span::raw("")
                },
            ]),
        };
        let label_line = Line::from(Span::styled(format!(" {}", field.label()), label_style));

        let block = Block::default()
            .borders(Borders::LEFT)
            .border_style(rule_style);

        f.render_widget(
            Paragraph::new(vec![label_line, value_line]).block(block),
            chunks[i],
        );
    }
}

fn render_form_footer(f: &mut Frame, area: Rect, state: &FormState) {
    let content = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", RetentionTheme::danger()),
            Span::styled(err.clone(), RetentionTheme::danger()),
        ])
    } else {
        Line::from(vec![
            Span::styled("[↑↓] ", RetentionTheme::key_hint()),
            Span::styled("Navigate ", RetentionTheme::key_desc()),
            Span::styled("[←→] ", RetentionTheme::key_hint()),
            Span::styled("Choose ", RetentionTheme::key_desc()),
            Span::styled("[Enter] ", RetentionTheme::key_hint()),
            Span::styled("Predict ", RetentionTheme::key_desc()),
            Span::styled("[Ctrl+R] ", RetentionTheme::key_hint()),
            Span::styled("Reset ", RetentionTheme::key_desc()),
            Span::styled("[Esc] ", RetentionTheme::key_hint()),
            Span::styled("Quit", RetentionTheme::key_desc()),
        ])
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(RetentionTheme::border()),
    );

    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_into(state: &mut FormState, field: Field, text: &str) {
        state.selected_field = field;
        state.clear_field();
        for c in text.chars() {
            state.input_char(c);
        }
    }

    #[test]
    fn test_defaults_produce_default_inputs() {
        let state = FormState::default();
        assert_eq!(state.raw_inputs(), Ok(RawInputs::default()));
    }

    #[test]
    fn test_tenure_rejects_out_of_bounds_keystrokes() {
        let mut state = FormState::default();
        type_into(&mut state, Field::Tenure, "72");
        assert_eq!(state.tenure, "72");

        // 721 would exceed the maximum
        assert!(!state.input_char('1'));
        assert_eq!(state.tenure, "72");

        type_into(&mut state, Field::Tenure, "73");
        assert_eq!(state.tenure, "7");

        type_into(&mut state, Field::Tenure, "-5");
        assert_eq!(state.tenure, "5");

        type_into(&mut state, Field::Tenure, "0");
        assert_eq!(state.raw_inputs().map(|r| r.tenure), Ok(0));
    }

    #[test]
    fn test_charges_accept_single_decimal_point() {
        let mut state = FormState::default();
        type_into(&mut state, Field::MonthlyCharges, "89.9.5");
        assert_eq!(state.monthly_charges, "89.95");

        type_into(&mut state, Field::TotalCharges, ".5");
        assert_eq!(state.total_charges, "0.5");

        type_into(&mut state, Field::TotalCharges, "-12e3");
        assert_eq!(state.total_charges, "123");

        let raw = state.raw_inputs().expect("valid");
        assert!((raw.monthly_charges - 89.95).abs() < 1e-9);
        assert!((raw.total_charges - 123.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_field_is_reported() {
        let mut state = FormState::default();
        state.selected_field = Field::MonthlyCharges;
        state.clear_field();
        assert_eq!(
            state.raw_inputs(),
            Err("Monthly Charges: value required".to_string())
        );
    }

    #[test]
    fn test_choice_cycling_only_on_choice_fields() {
        let mut state = FormState::default();
        state.next_choice();
        assert_eq!(state.contract, Contract::MonthToMonth);

        state.selected_field = Field::Contract;
        state.next_choice();
        assert_eq!(state.contract, Contract::OneYear);
        state.prev_choice();
        state.prev_choice();
        assert_eq!(state.contract, Contract::TwoYear);

        state.selected_field = Field::PaymentMethod;
        state.prev_choice();
        assert_eq!(state.payment_method, PaymentMethod::CreditCard);
        assert!(!state.input_char('1'));
    }

    fn render_to_text(state: &FormState, width: u16, height: u16) -> String {
        use ratatui::{backend::TestBackend, Terminal};

        let mut terminal = Terminal::new(TestBackend::new(width, height)).expect("test terminal");
        terminal
            .draw(|f| render_form(f, f.area(), state))
            .expect("draw");
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_every_field_value_fits_a_short_form() {
        // Height left for the form on a 24-row terminal.
        let text = render_to_text(&FormState::default(), 44, 18);
        for expected in [
            "Tenure (months)",
            "12",
            "70.0",
            "800.0",
            "Month-to-month",
            "Electronic check",
            "Predict Churn Risk",
        ] {
            assert!(text.contains(expected), "missing {expected:?}");
        }
    }

    #[test]
    fn test_navigation_wraps() {
        let mut state = FormState::default();
        state.prev_field();
        assert_eq!(state.selected_field, Field::Submit);
        state.next_field();
        assert_eq!(state.selected_field, Field::Tenure);
    }
}

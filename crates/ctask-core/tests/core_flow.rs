use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use chrono::NaiveDate;
use ctask_core::autosave::{AutosaveSession, SaveOutcome, SaveRequest, SaveStatus, SaveTrigger};
use ctask_core::calendar::MonthGrid;
use ctask_core::debounce::Ticket;
use ctask_core::due::{format_due_display, parse_due};
use ctask_core::editor::{ChangeHandler, ChangeSource, Embed, RichTextEditor, pdf_placeholder};
use ctask_core::picker::{
    DueDatePicker, PickerRequest, PickerSurface, ShiftSubtasksControl, TargetField,
};

/// In-memory editor that appends embeds as HTML.
#[derive(Default)]
struct MemoryEditor {
    html: String,
    handlers: Vec<ChangeHandler>,
}

impl MemoryEditor {
    fn type_text(&mut self, text: &str) {
        self.html.push_str(text);
        for handler in &mut self.handlers {
            handler(ChangeSource::User);
        }
    }
}

impl RichTextEditor for MemoryEditor {
    fn content(&self) -> String {
        self.html.clone()
    }

    fn set_content(&mut self, html: &str) {
        self.html = html.to_string();
        for handler in &mut self.handlers {
            handler(ChangeSource::Api);
        }
    }

    fn insert_embed(&mut self, embed: Embed) {
        match embed {
            Embed::Image { data_url } => self.html.push_str(&format!("<img src=\"{data_url}\">")),
            Embed::Link { text, href } => self.html.push_str(&format!("<a href=\"{href}\">{text}</a>")),
            Embed::Text(text) => self.html.push_str(&text),
        }
    }

    fn on_change(&mut self, handler: ChangeHandler) {
        self.handlers.push(handler);
    }
}

/// Timers keyed by due time, fired in order as the virtual clock advances.
#[derive(Default)]
struct VirtualTimers {
    queue: BTreeMap<u64, Vec<Ticket>>,
}

impl VirtualTimers {
    fn schedule(&mut self, ticket: Ticket) {
        self.queue.entry(ticket.due_at_ms()).or_default().push(ticket);
    }

    fn advance_to(&mut self, now_ms: u64) -> Vec<Ticket> {
        let later = self.queue.split_off(&(now_ms + 1));
        let due = std::mem::replace(&mut self.queue, later);
        due.into_values().flatten().collect()
    }
}

#[test]
fn burst_of_edits_produces_one_save_after_quiet_period() {
    let session = Rc::new(RefCell::new(AutosaveSession::new("12", 2_000, 2_000)));
    let timers = Rc::new(RefCell::new(VirtualTimers::default()));
    let clock = Rc::new(RefCell::new(0_u64));

    let mut editor = MemoryEditor::default();
    {
        let session = Rc::clone(&session);
        let timers = Rc::clone(&timers);
        let clock = Rc::clone(&clock);
        editor.on_change(Box::new(move |source| {
            let now = *clock.borrow();
            if let Some(ticket) = session.borrow_mut().on_change(source, now) {
                timers.borrow_mut().schedule(ticket);
            }
        }));
    }

    editor.set_content("<p>loaded</p>");
    assert!(session.borrow().pending().is_none());

    for (at, text) in [(100, "a"), (900, "b"), (1_800, "c")] {
        *clock.borrow_mut() = at;
        editor.type_text(text);
    }

    let mut saves: Vec<(u64, SaveRequest)> = Vec::new();
    for now in (0..=6_000).step_by(100) {
        for ticket in timers.borrow_mut().advance_to(now) {
            if let Some(request) = session.borrow_mut().on_timer(ticket, editor.content()) {
                saves.push((now, request));
            }
        }
    }

    assert_eq!(saves.len(), 1);
    assert_eq!(saves[0].0, 3_800);
    assert_eq!(saves[0].1.update.task_id, "12");
    assert_eq!(saves[0].1.update.description, "<p>loaded</p>abc");
}

#[test]
fn dropped_pdf_becomes_placeholder_and_saves() {
    let mut session = AutosaveSession::new("44", 2_000, 2_000);
    let mut editor = MemoryEditor::default();

    for embed in pdf_placeholder("invoice.pdf") {
        editor.insert_embed(embed);
    }
    let request = session.save_now(SaveTrigger::Attachment, editor.content());

    assert_eq!(
        request.update.description,
        "<a href=\"#\">[Attached PDF: invoice.pdf]</a> "
    );
    assert_eq!(session.status(), SaveStatus::Saving);
    assert_eq!(
        session.finish(request.seq, &SaveOutcome::Rejected { status: 413 }),
        SaveStatus::Failed { status: Some(413) }
    );
}

/// Page model with a task form holding one due input.
#[derive(Default)]
struct PageModel {
    due_inputs: BTreeMap<String, String>,
    previews: BTreeMap<String, String>,
    hidden_inputs: Vec<(String, String)>,
    submissions: usize,
    time: String,
    shift: ShiftSubtasksControl,
    last_grid: Option<MonthGrid>,
    dialog_visible: bool,
    without_form: bool,
}

impl PickerSurface for PageModel {
    fn field_value(&self, target: &TargetField) -> Option<String> {
        self.due_inputs.get(target.task_ref()).cloned()
    }

    fn write_field(&mut self, target: &TargetField, value: &str) {
        if let Some(input) = self.due_inputs.get_mut(target.task_ref()) {
            *input = value.to_string();
        }
    }

    fn show_preview(&mut self, target: &TargetField, label: &str) {
        self.previews.insert(target.task_ref().to_string(), label.to_string());
    }

    fn hide_preview(&mut self, target: &TargetField) {
        self.previews.remove(target.task_ref());
    }

    fn time_input(&self) -> String {
        self.time.clone()
    }

    fn set_time_input(&mut self, value: &str) {
        self.time = value.to_string();
    }

    fn shift_checked(&self) -> Option<bool> {
        Some(self.shift.checked)
    }

    fn set_shift_control(&mut self, control: ShiftSubtasksControl) {
        self.shift = control;
    }

    fn render_calendar(&mut self, grid: &MonthGrid) {
        self.last_grid = Some(grid.clone());
    }

    fn show_dialog(&mut self) {
        self.dialog_visible = true;
    }

    fn hide_dialog(&mut self) {
        self.dialog_visible = false;
    }

    fn upsert_shift_flag(&mut self, _target: &TargetField, shift: bool) -> bool {
        if self.without_form {
            return false;
        }
        let value = if shift { "true" } else { "false" }.to_string();
        match self
            .hidden_inputs
            .iter_mut()
            .find(|(name, _)| name == "shift_subtasks")
        {
            Some(entry) => entry.1 = value,
            None => self.hidden_inputs.push(("shift_subtasks".to_string(), value)),
        }
        true
    }

    fn submit_form(&mut self, _target: &TargetField) -> bool {
        self.submissions += 1;
        true
    }
}

#[test]
fn rescheduling_a_parent_task_submits_shift_flag() {
    let now = parse_due("2024-01-30 08:00:00").expect("valid now");
    let mut page = PageModel::default();
    page.due_inputs
        .insert("5".to_string(), "2024-01-31 17:00:00".to_string());

    let mut picker = DueDatePicker::default();
    picker.open(
        PickerRequest {
            task_ref: "5".to_string(),
            explicit_value: None,
            auto_save: true,
            has_subtasks: true,
        },
        &mut page,
        now.date(),
    );

    let grid = page.last_grid.clone().expect("calendar rendered");
    assert_eq!(grid.label, "Jan 2024");
    assert!(page.dialog_visible);
    assert!(page.shift.visible && page.shift.checked);

    let confirmation = picker.shift(0, 1, &mut page, now).expect("picker open");
    assert_eq!(confirmation.value, "2024-03-02 17:00:00");
    assert_eq!(page.due_inputs["5"], "2024-03-02 17:00:00");
    assert_eq!(page.previews["5"], "2 Mar 24 17:00");
    assert_eq!(
        page.hidden_inputs,
        vec![("shift_subtasks".to_string(), "true".to_string())]
    );
    assert_eq!(page.submissions, 1);
    assert!(!page.dialog_visible);
}

#[test]
fn month_navigation_round_trip_keeps_picked_day() {
    let today = NaiveDate::from_ymd_opt(2025, 12, 15).expect("valid date");
    let mut page = PageModel::default();
    page.due_inputs.insert("9".to_string(), String::new());

    let mut picker = DueDatePicker::default();
    picker.open(
        PickerRequest {
            task_ref: "9".to_string(),
            explicit_value: None,
            auto_save: false,
            has_subtasks: false,
        },
        &mut page,
        today,
    );
    picker.select_day(31, &mut page, today);
    picker.change_month(1, &mut page, today);
    assert_eq!(page.last_grid.as_ref().map(|g| g.label.as_str()), Some("Jan 2026"));
    picker.change_month(-1, &mut page, today);
    assert_eq!(page.last_grid.as_ref().map(|g| g.label.as_str()), Some("Dec 2025"));

    let confirmation = picker
        .save(&mut page, today.and_hms_opt(9, 0, 0).expect("valid time"))
        .expect("picker open");
    assert_eq!(confirmation.value, "2025-12-31 00:00:00");
    assert_eq!(format_due_display(&confirmation.value, today.and_hms_opt(9, 0, 0).expect("valid time")), "31 Dec 25");
    assert_eq!(page.submissions, 0);
}

#[test]
fn picker_on_a_page_without_due_input_or_form() {
    let now = parse_due("2025-01-03 10:00:00").expect("valid now");
    let mut page = PageModel {
        without_form: true,
        ..PageModel::default()
    };

    let mut picker = DueDatePicker::default();
    picker.open(
        PickerRequest {
            task_ref: "missing".to_string(),
            explicit_value: None,
            auto_save: true,
            has_subtasks: true,
        },
        &mut page,
        now.date(),
    );
    assert!(page.dialog_visible);
    assert_eq!(
        picker.select_day(9, &mut page, now.date()),
        NaiveDate::from_ymd_opt(2025, 1, 9)
    );

    let confirmation = picker.save(&mut page, now).expect("picker open");
    assert_eq!(confirmation.value, "2025-01-09 00:00:00");
    assert!(!confirmation.submitted);
    assert!(page.due_inputs.is_empty());
    assert!(page.hidden_inputs.is_empty());
    assert_eq!(page.submissions, 0);
    assert!(!page.dialog_visible);
    assert!(!picker.is_open());
}

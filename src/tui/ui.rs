use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

use crate::core::state::App;
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{MessageList, TitleBar};

/// One render pass: title bar, history, composer.
///
/// Copy targets are refreshed on every pass; `attach` skips blocks that
/// already carry an affordance.
pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, spinner_frame: usize) {
    use Constraint::{Length, Min};

    let input_height = tui.input_box.calculate_height(frame.area().width);
    let [title_area, main_area, input_area] =
        Layout::vertical([Length(1), Min(0), Length(input_height)]).areas(frame.area());

    let conversation = &app.conversation;
    let entries = conversation.entries();
    let is_pending = conversation.is_pending();

    tui.copy_targets.attach(entries);
    tui.message_list.observe(conversation.revision());

    let copied = tui.copied();
    let mut list = MessageList::new(&mut tui.message_list, entries, &tui.copy_targets, is_pending);
    list.copied = copied;
    list.spinner_frame = spinner_frame;
    list.render(frame, main_area);

    TitleBar::new(
        app.model_name.clone(),
        app.status_message.clone(),
        is_pending,
        tui.message_list.has_unseen_content(),
    )
    .render(frame, title_area);

    tui.input_box.pending = is_pending;
    tui.input_box.render(frame, input_area);
}

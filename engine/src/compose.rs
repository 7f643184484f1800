//! Mechanical composition of the active page into a 14-line frame.
//!
//! Title on the top row, six label/value line pairs below it. Datapoint
//! values are read through the remote port; a failed or degraded read
//! renders as dashes and never stops the frame from publishing.

use tracing::warn;

use cdu_types::{COLS, DisplayColor, DisplayFrame, FieldConfig, PageConfig, Quality, center};

use crate::ports::RemoteStore;

const VALUE_PLACEHOLDER: &str = "----";

pub(crate) fn compose_page(page: &PageConfig, remote: &dyn RemoteStore) -> DisplayFrame {
    let mut frame = DisplayFrame::default();
    frame.set(0, &center(&page.title, COLS), DisplayColor::Title);
    for (index, line) in page.lines.iter().take(6).enumerate() {
        let label_row = 1 + index * 2;
        frame.set(
            label_row,
            &side_by_side(&label_of(&line.left), &label_of(&line.right)),
            DisplayColor::Label,
        );
        frame.set(
            label_row + 1,
            &side_by_side(
                &value_of(&line.left, remote),
                &value_of(&line.right, remote),
            ),
            DisplayColor::Neutral,
        );
    }
    frame
}

fn label_of(field: &FieldConfig) -> String {
    field
        .display
        .as_ref()
        .and_then(|display| display.label.clone())
        .unwrap_or_default()
}

fn value_of(field: &FieldConfig, remote: &dyn RemoteStore) -> String {
    if let Some(source) = field
        .display
        .as_ref()
        .and_then(|display| display.source.as_deref())
    {
        return match remote.read(source) {
            Ok(read) if read.quality == Quality::Good => {
                let mut text = read.value.display();
                if let Some(unit) = remote.metadata(source).and_then(|meta| meta.unit) {
                    text.push(' ');
                    text.push_str(&unit);
                }
                text
            }
            Ok(_) => VALUE_PLACEHOLDER.to_string(),
            Err(err) => {
                warn!(source, %err, "datapoint read failed while composing page");
                VALUE_PLACEHOLDER.to_string()
            }
        };
    }
    field
        .button
        .as_ref()
        .and_then(|button| button.label.clone())
        .unwrap_or_default()
}

/// Left half left-justified, right half right-justified.
fn side_by_side(left: &str, right: &str) -> String {
    let half = COLS / 2;
    let left: String = left.chars().take(half).collect();
    let right: String = right.chars().take(half).collect();
    format!("{left:<half$}{right:>half$}")
}

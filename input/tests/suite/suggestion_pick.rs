use mentions_input::KeywordMatch;
use mentions_input::MentionsConfig;
use mentions_input::MentionsHandler;
use mentions_input::MentionsTextInput;
use mentions_input::Selection;
use pretty_assertions::assert_eq;

/// A host that looks suggestions up and remembers what the panel shows.
#[derive(Default)]
struct Picker {
    directory: Vec<&'static str>,
    shown: Vec<&'static str>,
    panel_open: bool,
    spans_ended: usize,
}

impl MentionsHandler for Picker {
    fn on_keyword(&mut self, keyword: &KeywordMatch) {
        let query = keyword.query().to_lowercase();
        self.shown = self
            .directory
            .iter()
            .copied()
            .filter(|name| name.starts_with(&query))
            .collect();
    }

    fn on_open_suggestions_panel(&mut self) {
        self.panel_open = true;
    }

    fn on_close_suggestions_panel(&mut self) {
        self.panel_open = false;
    }

    fn on_trigger_span_ended(&mut self) {
        self.spans_ended += 1;
    }
}

#[test]
fn picked_suggestion_extends_the_tracked_mention() -> anyhow::Result<()> {
    let picker = Picker {
        directory: vec!["alice", "albert", "bob"],
        ..Picker::default()
    };
    let mut input = MentionsTextInput::new(MentionsConfig::default(), picker)?;

    input.type_text("Hey @al");
    assert_eq!(input.handler().shown, vec!["alice", "albert"]);
    assert!(input.handler().panel_open);

    // The host swaps the keyword for the picked name, then ends the span.
    input.change_text("Hey @alice");
    input.change_selection(Selection::caret(10));
    assert_eq!(input.handler().shown, vec!["alice"]);
    input.stop_tracking();
    input.type_text(" ");

    let picker = input.handler();
    assert!(!picker.panel_open);
    assert_eq!(picker.spans_ended, 1);
    let spans: Vec<(usize, usize)> = input
        .tracker()
        .intervals()
        .iter()
        .map(|interval| (interval.start, interval.end))
        .collect();
    assert_eq!(spans, vec![(4, 9)]);
    assert!(!input.tracker().is_tracking());
    Ok(())
}

#[test]
fn clicking_back_into_a_mention_reopens_suggestions() -> anyhow::Result<()> {
    let picker = Picker {
        directory: vec!["alice", "bob", "bobby"],
        ..Picker::default()
    };
    let mut input = MentionsTextInput::new(MentionsConfig::default(), picker)?;
    input.type_text("@al and @bo ok");
    assert!(!input.handler().panel_open);

    input.click(10);
    assert!(input.handler().panel_open);
    assert_eq!(input.handler().shown, vec!["bob", "bobby"]);
    assert_eq!(input.tracker().active_index(), Some(1));

    input.click(14);
    assert!(!input.handler().panel_open);
    assert_eq!(input.handler().spans_ended, 3);
    Ok(())
}

//! Click dispatch: the view/connect/delete mode state machine.

/// Mutually exclusive interaction modes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
	#[default]
	View,
	Connect,
	Delete,
}

/// What a resolved click landed on. Node hits take priority over edge hits;
/// hit-testing enforces that ordering before a target reaches the dispatcher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClickTarget {
	Node(String),
	Edge(String),
	Background,
}

/// What the component should do in response to a click.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClickAction {
	ShowDetails(String),
	CloseDetails,
	MarkPending(String),
	ClearPending,
	RequestConnection { from: String, to: String },
	ConfirmDeleteBook(String),
	ConfirmDeleteConnection(String),
	None,
}

/// Current mode plus the in-progress connect selection.
#[derive(Debug, Default)]
pub struct InteractionState {
	mode: Mode,
	pending: Option<String>,
}

impl InteractionState {
	/// The first endpoint awaiting its partner in connect mode.
	pub fn pending(&self) -> Option<&str> {
		self.pending.as_deref()
	}

	/// Switch modes. Entering any mode clears the pending selection.
	pub fn set_mode(&mut self, mode: Mode) {
		self.mode = mode;
		self.pending = None;
	}

	/// Resolve one click against the current mode.
	pub fn click(&mut self, target: ClickTarget) -> ClickAction {
		match self.mode {
			Mode::View => match target {
				ClickTarget::Node(id) => ClickAction::ShowDetails(id),
				ClickTarget::Edge(_) | ClickTarget::Background => ClickAction::CloseDetails,
			},
			Mode::Connect => match target {
				ClickTarget::Node(id) => match self.pending.take() {
					None => {
						self.pending = Some(id.clone());
						ClickAction::MarkPending(id)
					}
					// Second click on the same node cancels; a self-connection
					// therefore never reaches the network.
					Some(first) if first == id => ClickAction::ClearPending,
					Some(first) => ClickAction::RequestConnection { from: first, to: id },
				},
				// Background and edge clicks keep the pending selection.
				ClickTarget::Edge(_) | ClickTarget::Background => ClickAction::None,
			},
			Mode::Delete => match target {
				ClickTarget::Node(id) => ClickAction::ConfirmDeleteBook(id),
				ClickTarget::Edge(id) => ClickAction::ConfirmDeleteConnection(id),
				ClickTarget::Background => ClickAction::None,
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn node(id: &str) -> ClickTarget {
		ClickTarget::Node(id.into())
	}

	#[test]
	fn view_mode_opens_and_closes_details() {
		let mut state = InteractionState::default();
		assert_eq!(state.click(node("1")), ClickAction::ShowDetails("1".into()));
		assert_eq!(state.click(ClickTarget::Background), ClickAction::CloseDetails);
	}

	#[test]
	fn connect_mode_pairs_two_distinct_nodes() {
		let mut state = InteractionState::default();
		state.set_mode(Mode::Connect);
		assert_eq!(state.click(node("1")), ClickAction::MarkPending("1".into()));
		assert_eq!(
			state.click(node("3")),
			ClickAction::RequestConnection {
				from: "1".into(),
				to: "3".into(),
			}
		);
		assert_eq!(state.pending(), None);
	}

	#[test]
	fn clicking_the_pending_node_again_cancels() {
		let mut state = InteractionState::default();
		state.set_mode(Mode::Connect);
		state.click(node("1"));
		assert_eq!(state.click(node("1")), ClickAction::ClearPending);
		assert_eq!(state.pending(), None);
	}

	#[test]
	fn background_click_keeps_the_pending_selection() {
		let mut state = InteractionState::default();
		state.set_mode(Mode::Connect);
		state.click(node("1"));
		assert_eq!(state.click(ClickTarget::Background), ClickAction::None);
		assert_eq!(state.pending(), Some("1"));
	}

	#[test]
	fn switching_mode_clears_the_pending_selection() {
		let mut state = InteractionState::default();
		state.set_mode(Mode::Connect);
		state.click(node("1"));
		state.set_mode(Mode::Delete);
		assert_eq!(state.pending(), None);
		// Re-entering connect mode starts from scratch.
		state.set_mode(Mode::Connect);
		assert_eq!(state.click(node("2")), ClickAction::MarkPending("2".into()));
	}

	#[test]
	fn delete_mode_confirms_books_and_connections() {
		let mut state = InteractionState::default();
		state.set_mode(Mode::Delete);
		assert_eq!(
			state.click(node("1")),
			ClickAction::ConfirmDeleteBook("1".into())
		);
		assert_eq!(
			state.click(ClickTarget::Edge("e1".into())),
			ClickAction::ConfirmDeleteConnection("e1".into())
		);
		assert_eq!(state.click(ClickTarget::Background), ClickAction::None);
	}
}

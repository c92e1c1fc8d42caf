use super::{ComponentState, StategateApp};
use tracing::debug;

impl StategateApp {
    /// Record `state` for `component`, logging the change from its previous state
    pub async fn set_component_state(&self, component: &str, state: ComponentState) {
        let previous = self
            .component_states
            .lock()
            .await
            .insert(component.to_string(), state.clone());

        match previous {
            Some(previous) if previous == state => {}
            Some(previous) => debug!("Component '{}': {:?} -> {:?}", component, previous, state),
            None => debug!("Component '{}' registered as {:?}", component, state),
        }
    }

    pub async fn get_component_state(&self, component: &str) -> Option<ComponentState> {
        self.component_states.lock().await.get(component).cloned()
    }

    /// `name=State` pairs sorted by name, for lifecycle log lines
    pub async fn component_summary(&self) -> String {
        let states = self.component_states.lock().await;
        let mut pairs: Vec<String> = states
            .iter()
            .map(|(name, state)| format!("{}={:?}", name, state))
            .collect();
        pairs.sort();
        pairs.join(", ")
    }
}

use crate::app::backend::DependencyStatus;
use crate::config::Area;
use crate::extension::FirebaseExtension;
use crate::result::FirebaseResult;

impl FirebaseExtension {
    /// Runs the backend dependency check. An unavailable status is still a
    /// successful call; inspect the payload.
    pub async fn initialize(&self) -> FirebaseResult<DependencyStatus> {
        let outcome = self.app.check_and_fix_dependencies().await;
        self.settle(Area::App, "initialize", "", outcome)
    }
}

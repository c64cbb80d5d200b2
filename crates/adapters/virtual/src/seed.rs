//! Preset seeding for demo instances.

use driphub_app::ports::AutomationRepository;
use driphub_domain::automation::presets;
use driphub_domain::error::DripHubError;
use driphub_domain::id::MerchantId;

/// Install the preset automations for `merchant_id`.
///
/// Presets the merchant already has (matched by name) are left
/// untouched, so this is safe to run on every start. Returns the number
/// of automations created.
///
/// # Errors
///
/// Returns a storage error propagated from the repository.
pub async fn seed_presets<R: AutomationRepository>(
    repo: &R,
    merchant_id: MerchantId,
) -> Result<u32, DripHubError> {
    let existing = repo.get_all().await?;
    let mut created = 0;
    for preset in presets::all(merchant_id) {
        if existing
            .iter()
            .any(|a| a.merchant_id == merchant_id && a.name == preset.name)
        {
            continue;
        }
        tracing::info!(name = %preset.name, "seeding preset automation");
        repo.create(preset).await?;
        created += 1;
    }
    Ok(created)
}

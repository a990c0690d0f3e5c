use crate::helpers::gcp::{GCP_REGION, GcpTestContext};
use function_name::named;
use gcp_automation::services::gcp::artifact_registry_service::ArtifactRegistryService;
use uuid::Uuid;

#[named]
#[test]
fn test_repository_lifecycle() {
    // setup:
    let context = GcpTestContext::from_env();
    let service = ArtifactRegistryService::new(context.gcloud());
    let repository_name = format!("automation-test-{}", &Uuid::new_v4().simple().to_string()[..8]);

    // execute:
    service
        .create_repository(
            GCP_REGION,
            &repository_name,
            hashmap! { "test_name".to_string() => function_name!().replace('_', "-") },
        )
        .expect("Cannot create repository");
    // stick a guard on the repository to delete it after test
    let _repository_guard = scopeguard::guard(&repository_name, |repository_name| {
        let _ = service.delete_repository(GCP_REGION, repository_name);
    });

    // verify:
    assert_eq!(service.repository_exists(GCP_REGION, &repository_name), Ok(true));

    // execute:
    service
        .delete_repository(GCP_REGION, &repository_name)
        .expect("Cannot delete repository");

    // verify:
    assert_eq!(service.repository_exists(GCP_REGION, &repository_name), Ok(false));
}

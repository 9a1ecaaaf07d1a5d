use icp_core::state::{ClientState, ClientStateRepository, ResumeProfile, VoiceGender};
use icp_infrastructure::paths::{IcpPaths, ServiceType};
use icp_infrastructure::{TomlClientStateRepository, load_settings};
use tempfile::TempDir;

#[tokio::test]
async fn test_full_state_round_trips_through_file() {
    let temp_dir = TempDir::new().unwrap();
    let paths = IcpPaths::new(Some(temp_dir.path().to_path_buf()));
    let path = paths.get_path(ServiceType::ClientState).unwrap();

    let repo = TomlClientStateRepository::at(path.clone()).await.unwrap();
    let state = ClientState {
        token: Some("header.payload.sig".to_string()),
        session_id: Some("abc123".to_string()),
        remaining_time_secs: Some(905),
        invalid_attempts: 1,
        camera_device_id: Some("cam-1".to_string()),
        mic_device_id: Some("mic-1".to_string()),
        female_voice_id: Some("zira".to_string()),
        male_voice_id: None,
        speaker_enabled: false,
        mic_enabled: true,
        camera_enabled: false,
        voice_gender: VoiceGender::Male,
        resume_profile: Some(ResumeProfile {
            job_title: Some("Backend Engineer".to_string()),
            resume_feedback: Some("{\"score\":71}".to_string()),
        }),
    };
    repo.save_state(state.clone()).await.unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("sessionId = \"abc123\""));

    let reopened = TomlClientStateRepository::at(path).await.unwrap();
    assert_eq!(reopened.get_state().await.unwrap(), state);
}

#[tokio::test]
async fn test_logout_style_wipe_persists() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("client_state.toml");

    let repo = TomlClientStateRepository::at(path.clone()).await.unwrap();
    repo.set_token("tok".to_string()).await.unwrap();
    repo.set_session_id("s1".to_string()).await.unwrap();
    repo.clear_all().await.unwrap();

    let reopened = TomlClientStateRepository::at(path).await.unwrap();
    assert_eq!(reopened.get_token().await, None);
    assert_eq!(reopened.get_session_id().await, None);
}

#[test]
fn test_settings_load_from_override_dir() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("settings.toml"),
        "default_questions = 5\nlanguage = \"en-GB\"\n",
    )
    .unwrap();

    let settings = load_settings(&IcpPaths::new(Some(temp_dir.path().to_path_buf()))).unwrap();
    assert_eq!(settings.default_questions, 5);
    assert_eq!(settings.language_prefix(), "en");
}

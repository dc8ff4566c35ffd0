use bazaar_chat_service::api;
use bazaar_chat_service::common::init;
use bazaar_chat_service::settings::AppSettings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = AppSettings::get();
    init::initialize_logging(settings);
    match settings.app_component.as_str() {
        "api" => api::serve(settings).await,
        _ => panic!("Unknown app component"),
    }
}

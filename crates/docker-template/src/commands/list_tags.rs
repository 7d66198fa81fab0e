use crate::settings::Settings;
use docker_template_core::list_tags;

/// 利用可能なタグを1行ずつ標準出力に表示
pub fn handle(settings: &Settings) -> anyhow::Result<()> {
    let config = settings.load_configuration()?;

    for tag in list_tags(&config) {
        println!("{}", tag);
    }

    Ok(())
}

use crate::settings::{RenderOptions, Settings};
use colored::Colorize;
use docker_template_core::{ResolvedTarget, resolve};

/// テンプレートを展開して出力ファイルに書き込む
pub fn handle(settings: &Settings, options: &RenderOptions) -> anyhow::Result<()> {
    let config = settings.load_configuration()?;
    let target = resolve(&options.tag, &config, None, options.policy)?;

    write_output(settings, options, &target)
}

/// 解決済みのタグでテンプレートを展開
pub(crate) fn write_output(
    settings: &Settings,
    options: &RenderOptions,
    target: &ResolvedTarget,
) -> anyhow::Result<()> {
    settings
        .renderer()
        .render_to_file(&options.template_file, &target.context, &options.output)?;

    println!(
        "{} {} を生成しました ({} → {})",
        "✓".green(),
        options.output.display().to_string().cyan(),
        options.template_file.display(),
        target.context_key.cyan()
    );
    Ok(())
}

use crate::commands::render;
use crate::settings::{BuildOptions, RenderOptions, Settings};
use colored::Colorize;
use docker_template_build::{BuildRequest, CommandRunner, run_build};
use docker_template_core::resolve;

/// テンプレートを展開してイメージをビルド
///
/// `--dry` の場合はテンプレートを展開せず、コマンドラインを表示するだけです。
/// ビルドに失敗しても生成したDockerfileはそのまま残ります。
pub fn handle(
    settings: &Settings,
    render_options: &RenderOptions,
    build_options: &BuildOptions,
    runner: &dyn CommandRunner,
) -> anyhow::Result<()> {
    let config = settings.load_configuration()?;
    let target = resolve(
        &render_options.tag,
        &config,
        build_options.registry.as_deref(),
        render_options.policy,
    )?;

    let command = BuildRequest::new(&target)
        .platform(build_options.platform.clone())
        .include_latest(build_options.include_latest)
        .explicit_tags(build_options.explicit_tags.clone())
        .additional_args(build_options.additional_args.clone())
        .dockerfile(Some(render_options.output.clone()))
        .program(build_options.builder.as_str())
        .build()?;

    if build_options.dry {
        println!("DRY RUN - resulting command line call would be:");
        println!("{}", command);
        return Ok(());
    }

    render::write_output(settings, render_options, &target)?;

    println!("  {} {}", "→".blue(), command.to_string().bold());
    run_build(runner, &command)?;

    println!("{}", "✓ ビルドが完了しました".green());
    for image in command.image_refs() {
        println!("  • {}", image.cyan());
    }
    Ok(())
}

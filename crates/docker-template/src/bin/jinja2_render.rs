use clap::Parser;
use docker_template::commands;
use docker_template::settings::{DEFAULT_OUTPUT_FILE, DEFAULT_TEMPLATE_FILE, RenderOptions, Settings};
use docker_template_core::{ConfigSection, ResolutionPolicy};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "jinja2-render", version)]
#[command(about = "コマンドラインからJinja2テンプレートを展開する", long_about = None)]
struct Cli {
    /// コンテキストを定義した設定ファイル（省略時は contexts.{yaml,yml,json,kdl} を探索）
    #[arg(short = 'c', env = "JINJA2_RENDER_CONTEXTS")]
    contexts: Option<PathBuf>,
    /// 使用するJinja2テンプレート
    #[arg(short = 'f', default_value = DEFAULT_TEMPLATE_FILE)]
    template: PathBuf,
    /// 出力先ファイル
    #[arg(short = 'o', default_value = DEFAULT_OUTPUT_FILE)]
    output: PathBuf,
    /// 詳細なログを出力
    #[arg(short, long)]
    verbose: bool,
    /// 展開に使うコンテキスト。省略すると設定ファイル内のコンテキスト一覧を表示
    which: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    docker_template::logging::init(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => docker_template::report_error(&e),
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let settings =
        Settings::from_current_dir(ConfigSection::Contexts)?.with_config_file(cli.contexts);

    let Some(which) = cli.which else {
        eprintln!("No context to render the template was provided. Please choose from:");
        return commands::list_tags::handle(&settings);
    };

    let options = RenderOptions {
        tag: which,
        template_file: cli.template,
        output: cli.output,
        policy: ResolutionPolicy::WholeStringKey,
    };
    commands::render::handle(&settings, &options)
}

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use rust_cms::content::faq::{self, FaqItem};
use rust_cms::content::toc::{self, TocNode};
use rust_cms::core::{Engine, Server};
use rust_cms::theme::animation::{class_for, resolve_all, TemplateId};
use rust_cms::{Post, ThemeRenderer};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// 指定站点目录
    #[arg(short, long, default_value = ".")]
    pub path: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 渲染单篇文章
    Render(RenderArgs),

    /// 生成静态文件
    Generate,

    /// 打印文件的目录结构
    Toc(TocArgs),

    /// FAQ 与 markdown 互相转换
    Faq(FaqArgs),

    /// 列出所有模板及其动画
    Templates,

    /// 启动本地服务器
    Server(ServerArgs),

    /// 清理生成的文件
    Clean,
}

#[derive(Args)]
pub struct RenderArgs {
    /// 文章 JSON 文件
    pub file: PathBuf,

    /// 输出文件，缺省时打印到标准输出
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 只输出内容块，不套用页面布局
    #[arg(long)]
    pub fragment: bool,
}

#[derive(Args)]
pub struct TocArgs {
    /// markdown 或 HTML 文件
    pub file: PathBuf,

    /// 最大标题层级
    #[arg(long, default_value = "6")]
    pub max_level: u8,

    /// 按 HTML 解析（.html 文件自动识别）
    #[arg(long)]
    pub html: bool,
}

#[derive(Args)]
pub struct FaqArgs {
    #[command(subcommand)]
    command: FaqCommands,
}

#[derive(Subcommand)]
enum FaqCommands {
    /// JSON 数组转为 markdown
    Encode {
        /// FAQ JSON 文件
        file: PathBuf,
    },
    /// markdown 转为 JSON 数组
    Decode {
        /// FAQ markdown 文件
        file: PathBuf,
    },
}

#[derive(Args)]
pub struct ServerArgs {
    /// 服务器端口
    #[arg(short, long, default_value = "4000")]
    pub port: u16,
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("读取文件失败: {}", path.display()))
}

fn print_tree(nodes: &[TocNode], depth: usize) {
    for node in nodes {
        println!(
            "{}{} {}",
            "  ".repeat(depth),
            node.entry.text,
            format!("#{}", node.entry.id).bright_black()
        );
        print_tree(&node.children, depth + 1);
    }
}

/// 执行命令
pub async fn execute(cli: Cli) -> Result<()> {
    let site_path = cli.path.clone();

    match cli.command {
        Commands::Render(args) => {
            let engine = Engine::new(site_path)?;
            let post = Post::load(&args.file)?;
            let renderer = ThemeRenderer::new(&engine.base_dir, engine.config.clone())?;

            let html = if args.fragment {
                renderer.render_fragment(&post)
            } else {
                renderer.render_post(&post)?
            };

            match args.output {
                Some(output) => {
                    fs::write(&output, html)
                        .with_context(|| format!("写入文件失败: {}", output.display()))?;
                    info!("已输出: {}", output.display());
                }
                None => println!("{}", html),
            }
        }
        Commands::Generate => {
            let engine = Engine::new(site_path)?;
            let report = engine.generate()?;
            for (path, reason) in &report.failed {
                println!("{} {}: {}", "失败".red(), path.display(), reason);
            }
        }
        Commands::Toc(args) => {
            let source = read_file(&args.file)?;
            let is_html = args.html
                || args.file.extension().and_then(|s| s.to_str()) == Some("html");

            let entries = if is_html {
                toc::from_html(&source, args.max_level)
            } else {
                toc::from_markdown(&source, args.max_level)
            };

            let tree = toc::build_tree(entries);
            if tree.is_empty() {
                println!("{}", "没有找到标题".yellow());
            } else {
                print_tree(&tree, 0);
            }
        }
        Commands::Faq(args) => match args.command {
            FaqCommands::Encode { file } => {
                let items: Vec<FaqItem> = serde_json::from_str(&read_file(&file)?)
                    .with_context(|| format!("FAQ JSON 格式错误: {}", file.display()))?;
                println!("{}", faq::serialize(&items));
            }
            FaqCommands::Decode { file } => {
                let items = faq::deserialize(&read_file(&file)?);
                println!("{}", serde_json::to_string_pretty(&items)?);
            }
        },
        Commands::Templates => {
            for template in TemplateId::ALL {
                let layout = template.layout();
                println!("{} ({})", template.as_str().bright_cyan(), layout.name);
                for (slot, config) in resolve_all(template, None) {
                    let classes = class_for(&config);
                    let classes = if classes.is_empty() {
                        "-".bright_black().to_string()
                    } else {
                        classes.join(" ")
                    };
                    println!("  {:<8} {}", slot.as_str(), classes);
                }
            }
        }
        Commands::Server(args) => {
            let engine = Engine::new(site_path)?;
            engine.generate()?;
            Server::new(engine.public_dir.clone(), args.port).start().await?;
        }
        Commands::Clean => {
            Engine::new(site_path)?.clean()?;
        }
    }

    Ok(())
}

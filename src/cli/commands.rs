//! 命令处理逻辑
//!
//! 实现各种CLI命令的处理逻辑

use crate::cli::args::{Args, Commands, OutputFormat};
use crate::config::{Config, ConfigLoader, TomlConfigLoader};
use crate::core::{setup_signal_handlers, Monitor};
use crate::error::{NotificationError, Result};
use crate::health::{CheckOutcome, HttpProber, Prober};
use crate::notification::{
    LogOnlySink, MessageFormatter, NotificationRequest, NotificationSink, WebhookSink,
};
use async_trait::async_trait;
use chrono::Local;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// 命令处理器trait
#[async_trait]
pub trait Command: Send + Sync {
    /// 执行命令
    async fn execute(&self, args: &Args) -> Result<()>;
}

/// 加载命令行指定（或默认位置）的配置文件
async fn load_config(args: &Args) -> Result<Config> {
    let loader = TomlConfigLoader::new(true);
    loader.load_from_file(args.get_config_path()).await
}

/// 根据配置创建通知投递端
///
/// 未配置webhook时退化为只记录日志。
pub fn build_sink(config: &Config) -> Result<Arc<dyn NotificationSink>> {
    match WebhookSink::from_config(config)? {
        Some(sink) => Ok(Arc::new(sink)),
        None => {
            warn!("未配置webhook URL，通知只会写入日志");
            Ok(Arc::new(LogOnlySink))
        }
    }
}

/// 启动命令
pub struct StartCommand;

#[async_trait]
impl Command for StartCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        let config = load_config(args).await?;
        info!(
            "项目 {} 监控目标: {}",
            config.global.project_name, config.target.url
        );

        let prober: Arc<dyn Prober> = Arc::new(HttpProber::new()?);
        let sink = build_sink(&config)?;

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        setup_signal_handlers(shutdown_tx)?;

        Monitor::new(&config, prober, sink).run(shutdown_rx).await;

        println!("监控已停止");
        Ok(())
    }
}

/// 检测命令
///
/// 只探测一次并输出结果，不经过告警器，也不发送通知。
pub struct CheckCommand;

#[async_trait]
impl Command for CheckCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Check { format } = &args.command {
            let config = load_config(args).await?;
            let prober = HttpProber::new()?;

            let observation = prober
                .probe(&config.target.url, config.global.request_timeout())
                .await;

            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&observation)?);
                }
                OutputFormat::Text => {
                    let status_icon = if observation.outcome.is_healthy() {
                        "✓"
                    } else {
                        "✗"
                    };
                    println!(
                        "{} {} - {} - {}ms",
                        status_icon,
                        config.target.url,
                        observation.outcome,
                        observation.response_time_ms()
                    );
                    println!("  说明: {}", observation.outcome.description());
                }
            }
        }
        Ok(())
    }
}

/// 初始化命令
pub struct InitCommand;

#[async_trait]
impl Command for InitCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Init { config_path, force } = &args.command {
            self.create_config_file(config_path, *force).await
        } else {
            Ok(())
        }
    }
}

impl InitCommand {
    /// 配置文件模板
    const CONFIG_TEMPLATE: &'static str = include_str!("../../demos/config.toml");

    /// 创建配置文件
    async fn create_config_file(&self, config_path: &Path, force: bool) -> Result<()> {
        if config_path.exists() && !force {
            eprintln!("配置文件已存在: {}", config_path.display());
            eprintln!("使用 --force 参数覆盖现有文件");
            return Ok(());
        }

        if let Some(parent) = config_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        tokio::fs::write(config_path, Self::CONFIG_TEMPLATE).await?;

        println!("配置文件已创建: {}", config_path.display());
        println!("请编辑配置文件，填写监控目标和webhook地址");

        Ok(())
    }
}

/// 验证命令
pub struct ValidateCommand;

#[async_trait]
impl Command for ValidateCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Validate {
            config_path,
            verbose,
        } = &args.command
        {
            let config_file = config_path
                .clone()
                .unwrap_or_else(|| args.get_config_path());

            self.validate_config_file(&config_file, *verbose).await
        } else {
            Ok(())
        }
    }
}

impl ValidateCommand {
    /// 验证配置文件
    async fn validate_config_file(&self, config_path: &Path, verbose: bool) -> Result<()> {
        println!("验证配置文件: {}", config_path.display());

        let loader = TomlConfigLoader::new(true);
        let config = loader.load_from_file(config_path).await?;

        // 模板语法错误也要在启动前暴露出来
        MessageFormatter::with_templates(
            config.global.project_name.as_str(),
            config.notification.critical_template.as_deref(),
            config.notification.recovery_template.as_deref(),
        )?;

        if verbose {
            println!("配置验证通过！");
            println!("全局配置:");
            println!("  项目名称: {}", config.global.project_name);
            println!("  请求超时: {}秒", config.global.request_timeout_seconds);
            println!("  告警间隔: {}秒", config.global.alert_interval_seconds);
            println!("  历史记录: {}条", config.global.history_size);
            println!("监控目标: {}", config.target.url);
            println!("通知配置:");
            match &config.notification.webhook_url {
                Some(url) => println!("  webhook: {url}"),
                None => println!("  webhook: 未配置（只记录日志）"),
            }
            println!(
                "  告警模板: {}",
                if config.notification.critical_template.is_some() {
                    "自定义"
                } else {
                    "默认"
                }
            );
            println!(
                "  恢复模板: {}",
                if config.notification.recovery_template.is_some() {
                    "自定义"
                } else {
                    "默认"
                }
            );
        } else {
            println!("✓ 配置文件验证通过");
            println!("✓ 监控目标: {}", config.target.url);
        }

        Ok(())
    }
}

/// 测试通知命令
pub struct TestNotificationCommand;

#[async_trait]
impl Command for TestNotificationCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::TestNotification { recovery } = &args.command {
            self.test_notification(args, *recovery).await
        } else {
            Ok(())
        }
    }
}

impl TestNotificationCommand {
    /// 按真实格式发送一条示例通知
    async fn test_notification(&self, args: &Args, recovery: bool) -> Result<()> {
        let config = load_config(args).await?;

        let sink = WebhookSink::from_config(&config)?.ok_or_else(|| {
            NotificationError::ConfigError(
                "未配置webhook URL，请在配置文件中设置 notification.webhook_url".to_string(),
            )
        })?;

        let now = Local::now();
        let request = if recovery {
            NotificationRequest::recovery(config.target.url.as_str(), now)
        } else {
            NotificationRequest::critical(
                config.target.url.as_str(),
                CheckOutcome::Unhealthy { status_code: 503 },
                now,
            )
        };

        println!("📤 发送测试{}通知...", request.severity);
        sink.deliver(request).await?;
        println!("✅ 测试通知发送成功！请检查聊天群组是否收到消息。");

        Ok(())
    }
}

/// 版本命令
pub struct VersionCommand;

#[async_trait]
impl Command for VersionCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Version { format } = &args.command {
            match format {
                OutputFormat::Json => {
                    let version_info = serde_json::json!({
                        "name": crate::APP_NAME,
                        "version": crate::VERSION,
                        "description": crate::APP_DESCRIPTION
                    });
                    println!("{}", serde_json::to_string_pretty(&version_info)?);
                }
                OutputFormat::Text => {
                    println!("{} v{}", crate::APP_NAME, crate::VERSION);
                    println!("{}", crate::APP_DESCRIPTION);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_then_validate() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let args = Args::try_parse_from([
            "uptime-sentry",
            "init",
            config_path.to_str().unwrap(),
        ])
        .unwrap();
        InitCommand.execute(&args).await.unwrap();
        assert!(config_path.exists());

        // 模板里的 ${WEBHOOK_URL} 需要环境变量，这里关闭替换只检查结构
        let content = std::fs::read_to_string(&config_path).unwrap();
        let config = TomlConfigLoader::new(false)
            .load_from_string(&content.replace("${WEBHOOK_URL}", "https://hooks.example.com/x"))
            .await
            .unwrap();
        assert_eq!(config.global.alert_interval_seconds, 300);
    }

    #[tokio::test]
    async fn test_init_does_not_overwrite_without_force() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "keep me").unwrap();

        let args = Args::try_parse_from([
            "uptime-sentry",
            "init",
            config_path.to_str().unwrap(),
        ])
        .unwrap();
        InitCommand.execute(&args).await.unwrap();

        assert_eq!(std::fs::read_to_string(&config_path).unwrap(), "keep me");
    }

    #[tokio::test]
    async fn test_validate_missing_file_fails() {
        let args = Args::try_parse_from([
            "uptime-sentry",
            "validate",
            "/nonexistent/uptime-sentry.toml",
        ])
        .unwrap();

        assert!(ValidateCommand.execute(&args).await.is_err());
    }

    #[tokio::test]
    async fn test_notification_requires_webhook() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            "[global]\nproject_name = \"t\"\n\n[target]\nurl = \"https://example.com\"\n",
        )
        .unwrap();

        let args = Args::try_parse_from([
            "uptime-sentry",
            "-c",
            config_path.to_str().unwrap(),
            "test-notification",
        ])
        .unwrap();

        let err = TestNotificationCommand.execute(&args).await.unwrap_err();
        assert!(err.to_string().contains("webhook"));
    }

    #[test]
    fn test_build_sink_falls_back_to_log_only() {
        let config: Config = toml::from_str(
            "[global]\nproject_name = \"t\"\n\n[target]\nurl = \"https://example.com\"\n",
        )
        .unwrap();

        let sink = build_sink(&config).unwrap();
        assert_eq!(sink.name(), "log-only");
    }

    #[tokio::test]
    async fn test_validate_rejects_template_with_unknown_variable() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            r#"
[global]
project_name = "t"

[target]
url = "https://example.com"

[notification]
critical_template = "{{statuscode}} {{url}}"
"#,
        )
        .unwrap();

        let args = Args::try_parse_from([
            "uptime-sentry",
            "validate",
            config_path.to_str().unwrap(),
        ])
        .unwrap();

        let err = ValidateCommand.execute(&args).await.unwrap_err();
        assert!(err.to_string().contains("statuscode"));
    }
}

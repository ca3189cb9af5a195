use anyhow::Result;
use axum::Router;
use std::net::SocketAddr;
use std::path::PathBuf;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

/// 本地预览服务器，直接提供生成好的静态文件
pub struct Server {
    /// 站点目录
    public_dir: PathBuf,
    /// 端口
    port: u16,
}

impl Server {
    /// 创建新的服务器
    pub fn new(public_dir: PathBuf, port: u16) -> Self {
        Self { public_dir, port }
    }

    /// 启动服务器
    pub async fn start(self) -> Result<()> {
        let app = Router::new()
            .fallback_service(ServeDir::new(&self.public_dir))
            .layer(TraceLayer::new_for_http());

        let addr: SocketAddr = format!("0.0.0.0:{}", self.port).parse()?;
        info!("预览服务器已启动: http://localhost:{}", self.port);
        info!("目录: {}", self.public_dir.display());

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

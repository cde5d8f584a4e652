/// 根路径，用于存活探测
pub async fn root_handler() -> &'static str {
    "Hello from the server"
}

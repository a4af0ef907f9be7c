/// Root route for basic check
pub async fn root() -> &'static str {
    "Frontend Monitoring Server Running"
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

#[cfg(test)]
mod tests {
    use paysheet::utils::telemetry;

    #[test]
    fn test_telemetry_initialization() {
        // 初始化遥测系统
        telemetry::init_telemetry();
        // 重复初始化应被忽略
        telemetry::init_telemetry();

        tracing::debug!("This is a debug message");
        tracing::info!(
            payment_id = "pay_Test123",
            event = "payment.captured",
            "Structured payment log"
        );
    }
}

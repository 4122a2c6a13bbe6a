#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]

#[cfg(target_os = "none")]
mod firmware {
    #[cfg(not(feature = "defmt"))]
    use panic_halt as _;
    #[cfg(feature = "defmt")]
    use {defmt_rtt as _, panic_probe as _};

    use embassy_executor::Executor;
    use rgb_blinky::{app_init, hardware, AppContext};
    use static_cell::StaticCell;

    static EXECUTOR: StaticCell<Executor> = StaticCell::new();
    static APP: StaticCell<AppContext> = StaticCell::new();

    #[cortex_m_rt::entry]
    fn main() -> ! {
        // ハードウェア初期化
        let p = embassy_stm32::init(hardware::create_clock_config());

        #[cfg(feature = "defmt")]
        defmt::info!("RGB blinky • STM32G431VB @ 170MHz");

        let pins = hardware::init_led_pins(p);
        let ctx = APP.init(AppContext::new());

        // Executorに制御を渡す（戻らない）
        let executor = EXECUTOR.init(Executor::new());
        executor.run(move |spawner| {
            let mut kernel = hardware::EmbassyKernel::new(spawner);
            match app_init(&mut kernel, ctx, pins) {
                Ok(_) => {
                    #[cfg(feature = "defmt")]
                    defmt::info!("Kernel started");
                }
                Err(e) => {
                    #[cfg(feature = "defmt")]
                    defmt::error!(
                        "Thread creation failed ({}): status {=u32:#x}",
                        e.color.as_str(),
                        e.status_code()
                    );
                    #[cfg(not(feature = "defmt"))]
                    let _ = e;
                }
            }
        })
    }
}

/// ホスト実行: シミュレーションカーネルで500tick分動かして結果を表示
#[cfg(not(target_os = "none"))]
fn main() {
    use rgb_blinky::{
        app_init,
        sim::{SimKernel, SimPin},
        AppContext, LedPins,
    };

    const SIM_TICKS: u32 = 500;

    let ctx = Box::leak(Box::new(AppContext::new()));
    let pins = LedPins::new(SimPin::new(), SimPin::new(), SimPin::new());
    let mut kernel = SimKernel::<SimPin, 3>::new();

    if let Err(e) = app_init(&mut kernel, ctx, pins) {
        eprintln!(
            "thread creation failed ({}): {} (status {:#x})",
            e.color.as_str(),
            e.error.as_str(),
            e.status_code()
        );
        std::process::exit(1);
    }

    kernel.run_for(SIM_TICKS);

    println!("{} ticks simulated", kernel.now());
    for thread in kernel.threads() {
        let pin = thread.blinker().pin();
        println!(
            "{:<10} toggles={:<3} level={}",
            thread.options().name,
            pin.toggles(),
            if pin.is_high() { "high" } else { "low" }
        );
    }
}

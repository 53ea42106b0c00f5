use once_cell::sync::Lazy;
use provider_utils::enums::ENetwork;
use std::collections::HashMap;

/// On-chain ids of a Cetus CLMM deployment.
#[derive(Debug, Clone)]
pub struct CetusIds {
    /// Original clmm package, used in event and struct types.
    pub clmm_package_id: &'static str,
    pub integrate_published_at: &'static str,
    pub global_config_id: &'static str,
    pub pools_id: &'static str,
}

pub const CETUS_ALLOWED_TICK_SPACINGS: [u32; 6] = [2, 10, 20, 60, 200, 220];
pub const CETUS_DEFAULT_TICK_SPACING: u32 = 200;
pub const CETUS_POOL_URL: &str = "";

pub static CETUS_IDS: Lazy<HashMap<ENetwork, CetusIds>> = Lazy::new(|| {
    HashMap::from([
        (
            ENetwork::SuiMainnet,
            CetusIds {
                clmm_package_id:
                    "0x1eabed72c53feb3805120a081dc15963c204dc8d091542592abaf7a35689b2fb",
                integrate_published_at:
                    "0x996c4d9480708fb8b92aa7acf819fb0497b5ec8e65ba06601cae2fb6db3312c3",
                global_config_id:
                    "0xdaa46292632c3c4d8f31f23ea0f9b36a28ff3677e9684980e4438403a67a3d8f",
                pools_id: "0xf699e7f2276f5c9a75944b37a0c5b5d9ddfd2471bf6242483b03ab2887d198d0",
            },
        ),
        (
            ENetwork::SuiTestnet,
            CetusIds {
                clmm_package_id:
                    "0x0868b71c0cba55bf0faf6c40df8c179c67a4d0ba0e79965b68b3d72d7dfbf666",
                integrate_published_at:
                    "0xd55d88490e28ef68d83d2fe7862909dfcef6e43a2f50403f3a461c4678e274f1",
                global_config_id:
                    "0x6f4149091a5aea0e818e7243a13adcfb403842d670b9a2089de058512620687a",
                pools_id: "0xc090b101978bd6370def2666b7a31d7d07704f84e833e108a969eda86150e8cf",
            },
        ),
    ])
});

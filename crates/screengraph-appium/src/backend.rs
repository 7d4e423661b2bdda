use screengraph_core::Platform;

use crate::actions::ActionTools;
use crate::android::AndroidAppiumTools;
use crate::connection::{ConnectionTools, DriverSessionInfo};
use crate::data_gathering::DataGatheringTools;
use crate::ios::IosAppiumTools;

/// All three capability contracts in one object-safe bound.
pub trait PlatformTools: ConnectionTools + DataGatheringTools + ActionTools {}

impl<T: ConnectionTools + DataGatheringTools + ActionTools> PlatformTools for T {}

/// The closed set of backends, chosen once by the factory.
pub(crate) enum PlatformBackend {
    Android(AndroidAppiumTools),
    Ios(IosAppiumTools),
}

impl PlatformBackend {
    pub(crate) fn platform(&self) -> Platform {
        match self {
            PlatformBackend::Android(_) => Platform::Android,
            PlatformBackend::Ios(_) => Platform::Ios,
        }
    }

    pub(crate) fn tools(&self) -> &dyn PlatformTools {
        match self {
            PlatformBackend::Android(b) => b,
            PlatformBackend::Ios(b) => b,
        }
    }

    pub(crate) fn tools_mut(&mut self) -> &mut dyn PlatformTools {
        match self {
            PlatformBackend::Android(b) => b,
            PlatformBackend::Ios(b) => b,
        }
    }

    pub(crate) fn session_info(&self) -> Option<DriverSessionInfo> {
        match self {
            PlatformBackend::Android(b) => b.session_info(),
            PlatformBackend::Ios(_) => None,
        }
    }
}

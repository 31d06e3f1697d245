use crate::service::BatteryService;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Design-capacity lookup, probed at most once per process.
///
/// Design capacity has no stable interface; whether it is exposed at all
/// depends on the fuel-gauge driver.  The first answer, including "not
/// available", is cached.
#[derive(Debug, Default)]
pub struct DesignCapacityProbe {
    cached: OnceLock<Option<u32>>,
}

impl DesignCapacityProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Design capacity in mAh, probing `service` on first use.
    pub fn get<S: BatteryService + ?Sized>(&self, service: &S) -> Option<u32> {
        *self.cached.get_or_init(|| {
            let capacity = service.probe_design_capacity().filter(|mah| *mah > 0);
            match capacity {
                Some(mah) => debug!("Design capacity: {mah} mAh"),
                None => warn!("Design capacity not exposed by this fuel gauge"),
            }
            capacity
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeService;
    use std::sync::atomic::Ordering;

    #[test]
    fn probes_once_and_caches() {
        let mut svc = FakeService::default();
        svc.design_capacity = Some(4410);
        let probe = DesignCapacityProbe::new();

        assert_eq!(probe.get(&svc), Some(4410));
        assert_eq!(probe.get(&svc), Some(4410));
        assert_eq!(svc.probes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn caches_absence_too() {
        let svc = FakeService::default();
        let probe = DesignCapacityProbe::new();

        assert_eq!(probe.get(&svc), None);
        assert_eq!(probe.get(&svc), None);
        assert_eq!(svc.probes.load(Ordering::SeqCst), 1);
    }
}

//! Lookup registry
//!
//! Holds the ordered street and IP lookup lists, the user's configured
//! overrides, and one shared adapter per lookup name. Adapters are built on
//! first use and the same instance is handed out afterwards.

use crate::config::Config;
use crate::error::Result;
use crate::lookup::endpoint::EndpointLookup;
use crate::lookup::freegeoip::FreeGeoIp;
use crate::lookup::{Lookup, LookupSettings, ProviderName, TestLookup, IP_PROVIDERS, STREET_PROVIDERS};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Builds the adapter for one lookup name
pub type LookupFactory = Arc<dyn Fn(&LookupSettings) -> Result<Arc<dyn Lookup>> + Send + Sync>;

/// Merge configured names in front of the built-in list
///
/// Order is preserved and the first occurrence of a name wins, so every
/// configured name comes before every built-in one.
pub fn merge_providers(builtins: &[ProviderName], configured: &[ProviderName]) -> Vec<ProviderName> {
    let mut merged = Vec::with_capacity(builtins.len() + configured.len());
    for name in configured.iter().chain(builtins) {
        if !merged.contains(name) {
            merged.push(*name);
        }
    }
    merged
}

/// Adapter used when no factory was registered for `name`
fn default_adapter(name: ProviderName, settings: &LookupSettings) -> Result<Arc<dyn Lookup>> {
    use ProviderName::*;

    let lookup: Arc<dyn Lookup> = match name {
        Nominatim => Arc::new(super::nominatim::Nominatim::new(settings)?),
        Freegeoip => Arc::new(FreeGeoIp::new(settings)?),
        Test => Arc::new(TestLookup::new()),
        Dstk | Esri | Google | GooglePremier | GooglePlacesDetails | Yahoo | Bing | GeocoderCa
        | GeocoderUs | Yandex | Mapquest | Opencagedata | Ovi | Here | Baidu | Geocodio
        | SmartyStreets | Okf | PostcodeAnywhereUk | BaiduIp | Geoip2 | Maxmind
        | MaxmindLocal | Telize | Pointpin | MaxmindGeoip2 => {
            Arc::new(EndpointLookup::new(name, settings))
        }
    };
    Ok(lookup)
}

/// Registry of lookup adapters
pub struct Registry {
    street: Vec<ProviderName>,
    ip: Vec<ProviderName>,
    configured_street: Vec<ProviderName>,
    configured_ip: Vec<ProviderName>,
    settings: LookupSettings,
    factories: HashMap<ProviderName, LookupFactory>,
    cache: Mutex<HashMap<ProviderName, Arc<dyn Lookup>>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("street", &self.street)
            .field("ip", &self.ip)
            .field("configured_street", &self.configured_street)
            .field("configured_ip", &self.configured_ip)
            .finish_non_exhaustive()
    }
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Registry using the `[lookup]` and `[api_keys]` config sections
    pub fn from_config(config: &Config) -> Result<Self> {
        let street = config.lookup.street_providers()?;
        let ip = config.lookup.ip_providers()?;
        Ok(Self::builder()
            .configured_street(street)
            .configured_ip(ip)
            .settings(LookupSettings::from_config(config)?)
            .build())
    }

    /// Street lookups: configured names first, then the built-in list
    ///
    /// The `test` lookup is always present.
    pub fn street_providers(&self) -> Vec<ProviderName> {
        let mut names = merge_providers(&self.street, &self.configured_street);
        if !names.contains(&ProviderName::Test) {
            names.push(ProviderName::Test);
        }
        names
    }

    /// IP lookups: configured names first, then the built-in list
    pub fn ip_providers(&self) -> Vec<ProviderName> {
        merge_providers(&self.ip, &self.configured_ip)
    }

    /// Every known lookup, street lookups first
    pub fn all_providers(&self) -> Vec<ProviderName> {
        merge_providers(&self.ip_providers(), &self.street_providers())
    }

    /// The user's street override, possibly empty
    pub fn configured_street(&self) -> &[ProviderName] {
        &self.configured_street
    }

    /// The user's IP override, possibly empty
    pub fn configured_ip(&self) -> &[ProviderName] {
        &self.configured_ip
    }

    pub fn settings(&self) -> &LookupSettings {
        &self.settings
    }

    /// The shared adapter for `name`, built on first use
    ///
    /// Construction happens under the cache lock, so concurrent first calls
    /// for one name still yield a single instance.
    pub fn get(&self, name: ProviderName) -> Result<Arc<dyn Lookup>> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(lookup) = cache.get(&name) {
            return Ok(Arc::clone(lookup));
        }

        let lookup = match self.factories.get(&name) {
            Some(factory) => factory(&self.settings)?,
            None => default_adapter(name, &self.settings)?,
        };
        debug!("Constructed {} lookup ({})", name, name.class_name());
        cache.insert(name, Arc::clone(&lookup));
        Ok(lookup)
    }

    /// Like [`get`](Self::get), for a name that has not been parsed yet
    ///
    /// Unknown names fail with [`Error::UnknownLookup`](crate::Error::UnknownLookup).
    pub fn get_by_name(&self, name: &str) -> Result<Arc<dyn Lookup>> {
        self.get(name.parse()?)
    }

    pub fn is_cached(&self, name: ProviderName) -> bool {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&name)
    }

    /// Drop every constructed adapter; the next `get` builds afresh
    pub fn clear_cache(&self) {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// Builder for [`Registry`]
pub struct RegistryBuilder {
    street: Vec<ProviderName>,
    ip: Vec<ProviderName>,
    configured_street: Vec<ProviderName>,
    configured_ip: Vec<ProviderName>,
    settings: LookupSettings,
    factories: HashMap<ProviderName, LookupFactory>,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self {
            street: STREET_PROVIDERS.to_vec(),
            ip: IP_PROVIDERS.to_vec(),
            configured_street: Vec::new(),
            configured_ip: Vec::new(),
            settings: LookupSettings::default(),
            factories: HashMap::new(),
        }
    }
}

impl RegistryBuilder {
    /// Replace the built-in street lookup list
    pub fn street_providers(mut self, names: impl IntoIterator<Item = ProviderName>) -> Self {
        self.street = names.into_iter().collect();
        self
    }

    /// Replace the built-in IP lookup list
    pub fn ip_providers(mut self, names: impl IntoIterator<Item = ProviderName>) -> Self {
        self.ip = names.into_iter().collect();
        self
    }

    pub fn configured_street(mut self, names: impl IntoIterator<Item = ProviderName>) -> Self {
        self.configured_street = names.into_iter().collect();
        self
    }

    pub fn configured_ip(mut self, names: impl IntoIterator<Item = ProviderName>) -> Self {
        self.configured_ip = names.into_iter().collect();
        self
    }

    pub fn settings(mut self, settings: LookupSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Build `name`'s adapter with `factory` instead of the bundled one
    pub fn factory<F>(mut self, name: ProviderName, factory: F) -> Self
    where
        F: Fn(&LookupSettings) -> Result<Arc<dyn Lookup>> + Send + Sync + 'static,
    {
        self.factories.insert(name, Arc::new(factory));
        self
    }

    /// Use an already built adapter for `name`
    pub fn adapter(self, name: ProviderName, lookup: Arc<dyn Lookup>) -> Self {
        self.factory(name, move |_| Ok(Arc::clone(&lookup)))
    }

    pub fn build(self) -> Registry {
        Registry {
            street: self.street,
            ip: self.ip,
            configured_street: self.configured_street,
            configured_ip: self.configured_ip,
            settings: self.settings,
            factories: self.factories,
            cache: Mutex::new(HashMap::new()),
        }
    }
}

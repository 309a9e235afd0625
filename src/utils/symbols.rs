use std::collections::HashMap;

/// ISO 4217 code → display symbol.
const SYMBOLS: &[(&str, &str)] = &[
    ("AED", "د.إ"), ("AFN", "؋"), ("ALL", "L"), ("AMD", "֏"), ("ANG", "ƒ"),
    ("AOA", "Kz"), ("ARS", "$"), ("AUD", "A$"), ("AWG", "ƒ"), ("AZN", "₼"),
    ("BAM", "KM"), ("BBD", "Bds$"), ("BDT", "৳"), ("BGN", "лв"), ("BHD", ".د.ب"),
    ("BIF", "FBu"), ("BMD", "$"), ("BND", "B$"), ("BOB", "Bs."), ("BRL", "R$"),
    ("BSD", "B$"), ("BTN", "Nu."), ("BWP", "P"), ("BYN", "Br"), ("BZD", "BZ$"),
    ("CAD", "C$"), ("CDF", "FC"), ("CHF", "CHF"), ("CLP", "$"), ("CNY", "¥"),
    ("COP", "$"), ("CRC", "₡"), ("CUP", "₱"), ("CVE", "Esc"), ("CZK", "Kč"),
    ("DJF", "Fdj"), ("DKK", "kr"), ("DOP", "RD$"), ("DZD", "دج"), ("EGP", "E£"),
    ("ERN", "Nfk"), ("ETB", "Br"), ("EUR", "€"), ("FJD", "FJ$"), ("FKP", "£"),
    ("FOK", "kr"), ("GBP", "£"), ("GEL", "₾"), ("GGP", "£"), ("GHS", "₵"),
    ("GIP", "£"), ("GMD", "D"), ("GNF", "FG"), ("GTQ", "Q"), ("GYD", "G$"),
    ("HKD", "HK$"), ("HNL", "L"), ("HRK", "kn"), ("HTG", "G"), ("HUF", "Ft"),
    ("IDR", "Rp"), ("ILS", "₪"), ("IMP", "£"), ("INR", "₹"), ("IQD", "ع.د"),
    ("IRR", "﷼"), ("ISK", "kr"), ("JEP", "£"), ("JMD", "J$"), ("JOD", "JD"),
    ("JPY", "¥"), ("KES", "KSh"), ("KGS", "с"), ("KHR", "៛"), ("KID", "$"),
    ("KMF", "CF"), ("KRW", "₩"), ("KWD", "KD"), ("KYD", "CI$"), ("KZT", "₸"),
    ("LAK", "₭"), ("LBP", "L£"), ("LKR", "Rs"), ("LRD", "L$"), ("LSL", "L"),
    ("LYD", "LD"), ("MAD", "MAD"), ("MDL", "L"), ("MGA", "Ar"), ("MKD", "ден"),
    ("MMK", "K"), ("MNT", "₮"), ("MOP", "MOP$"), ("MRU", "UM"), ("MUR", "₨"),
    ("MVR", "Rf"), ("MWK", "MK"), ("MXN", "Mex$"), ("MYR", "RM"), ("MZN", "MT"),
    ("NAD", "N$"), ("NGN", "₦"), ("NIO", "C$"), ("NOK", "kr"), ("NPR", "₨"),
    ("NZD", "NZ$"), ("OMR", "﷼"), ("PAB", "B/."), ("PEN", "S/"), ("PGK", "K"),
    ("PHP", "₱"), ("PKR", "₨"), ("PLN", "zł"), ("PYG", "₲"), ("QAR", "﷼"),
    ("RON", "lei"), ("RSD", "дин."), ("RUB", "₽"), ("RWF", "FRw"), ("SAR", "﷼"),
    ("SBD", "SI$"), ("SCR", "₨"), ("SDG", "ج.س."), ("SEK", "kr"), ("SGD", "S$"),
    ("SHP", "£"), ("SLE", "Le"), ("SLL", "Le"), ("SOS", "Sh"), ("SRD", "$"),
    ("SSP", "£"), ("STN", "Db"), ("SYP", "£S"), ("SZL", "E"), ("THB", "฿"),
    ("TJS", "SM"), ("TMT", "T"), ("TND", "DT"), ("TOP", "T$"), ("TRY", "₺"),
    ("TTD", "TT$"), ("TVD", "$"), ("TWD", "NT$"), ("TZS", "TSh"), ("UAH", "₴"),
    ("UGX", "USh"), ("USD", "$"), ("UYU", "$U"), ("UZS", "soʻm"), ("VES", "Bs.S"),
    ("VND", "₫"), ("VUV", "VT"), ("WST", "WS$"), ("XAF", "FCFA"), ("XCD", "EC$"),
    ("XDR", "SDR"), ("XOF", "CFA"), ("XPF", "₣"), ("YER", "﷼"), ("ZAR", "R"),
    ("ZMW", "ZK"), ("ZWL", "Z$"),
];

/// Read-only symbol lookup, built once at startup and shared through `AppState`.
#[derive(Debug, Clone)]
pub struct CurrencySymbols {
    map: HashMap<&'static str, &'static str>,
}

impl CurrencySymbols {
    pub fn builtin() -> Self {
        Self { map: SYMBOLS.iter().copied().collect() }
    }

    /// Exact-match lookup; `"usd"` has no symbol.
    pub fn get(&self, code: &str) -> Option<&'static str> {
        self.map.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }
}

impl Default for CurrencySymbols {
    fn default() -> Self {
        Self::builtin()
    }
}
